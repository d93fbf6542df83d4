use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::events::ShowCommand;
use crate::finder::RenderProbe;
use crate::presentation::PresentationSink;
use crate::session::Slideshow;
use crate::timer::TimerQueue;

/// Runs a session on tokio time until cancelled.
///
/// Rules:
/// - Both periodic jobs share one `TimerQueue` and this single task, so a
///   tick always finishes before the next one can start.
/// - Commands are applied between ticks, in arrival order.
/// - With `stop_when_exhausted`, a pool whose slots have all failed halts
///   the show with "no photos".
/// - Cancellation tears the session down before returning.
#[instrument(skip_all, fields(views = session.pool().len()))]
pub async fn run<P, S>(
    mut session: Slideshow<P, S>,
    mut commands: Receiver<ShowCommand>,
    cancel: CancellationToken,
    stop_when_exhausted: bool,
) -> Result<Slideshow<P, S>>
where
    P: RenderProbe,
    S: PresentationSink,
{
    let origin = Instant::now();
    let mut queue = TimerQueue::new();
    let mut commands_open = true;

    if !session.launch(&mut queue) {
        info!("slideshow not started; waiting for shutdown");
    }

    loop {
        // A deadline past what `Instant` can hold never fires.
        let deadline = queue.next_deadline().and_then(|at| origin.checked_add(at));
        select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = commands.recv(), if commands_open => {
                match maybe_cmd {
                    Some(command) => {
                        queue.advance_to(origin.elapsed());
                        session.apply(command, &mut queue);
                    }
                    None => {
                        // Nobody can steer the show any more; it keeps running.
                        debug!("command channel closed");
                        commands_open = false;
                    }
                }
            }

            _ = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                queue.advance_to(origin.elapsed());
                session.run_due(&mut queue);
                if stop_when_exhausted && session.declare_no_photos_if_exhausted(&mut queue) {
                    info!("every photo failed; slideshow halted");
                }
            }
        }
    }

    session.teardown(&mut queue);
    debug!(pending = queue.len(), "slideshow task stopped");
    Ok(session)
}
