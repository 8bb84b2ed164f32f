pub mod emit;
pub mod run;
pub mod status;

/// Exit code when `run` cannot start the wrapped program (shell convention).
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Map a handler result to a process exit code, printing the error chain.
pub fn exit_code(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
