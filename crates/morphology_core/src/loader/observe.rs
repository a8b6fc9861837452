use super::ArtifactResult;
use log::{debug, error};
use std::path::Path;
use std::time::Instant;

/// Runs one loader operation and emits `artifact_<op>` start/ok/error events.
pub(super) fn observe<T>(
    op: &str,
    kind: &str,
    path: &Path,
    run: impl FnOnce() -> ArtifactResult<T>,
) -> ArtifactResult<T> {
    let started_at = Instant::now();
    debug!("event=artifact_{op} module=loader status=start kind={kind}");

    let result = run();
    match &result {
        Ok(_) => debug!(
            "event=artifact_{op} module=loader status=ok kind={kind} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            concat!(
                "event=artifact_{op} module=loader status=error kind={kind} ",
                "duration_ms={} error_code={} path={}"
            ),
            started_at.elapsed().as_millis(),
            err.code(),
            path.display(),
            op = op,
            kind = kind
        ),
    }
    result
}
