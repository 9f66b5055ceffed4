//! Tests for error handling

use std::io;

use memtrace_core::error::{WorkloadError, WorkloadResult};

#[test]
fn test_workload_error_from_io()
{
    let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
    let err: WorkloadError = io_err.into();
    let message = format!("{}", err);
    assert!(message.contains("IO error"));
    assert!(message.contains("pipe closed"));
}

#[test]
fn test_workload_result_question_mark()
{
    fn fails() -> WorkloadResult<()>
    {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin gone"))?;
        Ok(())
    }

    assert!(matches!(fails(), Err(WorkloadError::Io(_))));
}
