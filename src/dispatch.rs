// ABOUTME: Routes commands to effect handlers: catalog searches, the debounce timer service, rendering.
// ABOUTME: Effects complete by enqueuing events; nothing here calls back into the machine directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future;

use crate::catalog::{Catalog, make_query_slug};
use crate::commands::Command;
use crate::render::Renderer;
use crate::runtime::EventSender;
use crate::state::Event;

/// Opaque handle for a debounce timer issued by [`Timers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// The collaborators the dispatcher hands work to.
pub struct Effects<C> {
    pub catalog: Arc<C>,
    pub timers: Timers,
    pub renderer: Box<dyn Renderer>,
}

/// Dispatch one command. Routing is synchronous; the slow parts run in
/// spawned tasks that report back through the event queue.
pub fn execute<C: Catalog>(command: Command, emit: &EventSender, effects: &Effects<C>) {
    match command {
        Command::Render(params) => {
            effects.renderer.render(&params);
            tracing::debug!("Rendered {}", params.screen);
        }
        Command::MovieSearch { query } => {
            let slug = make_query_slug(&query);
            let catalog = effects.catalog.clone();
            let emit = emit.clone();
            tokio::spawn(async move {
                match catalog.search(&slug).await {
                    Ok(page) => {
                        let _ = emit.send(Event::SearchResultsReceived {
                            results: page.results,
                            query,
                        });
                    }
                    Err(e) => {
                        // The error screen needs no detail; the reason stops here.
                        tracing::warn!("Movie search failed: {e}");
                        let _ = emit.send(Event::SearchErrorReceived { query });
                    }
                }
            });
        }
        Command::MovieDetailsSearch { movie_id } => {
            let catalog = effects.catalog.clone();
            let emit = emit.clone();
            tokio::spawn(async move {
                let both = future::try_join(
                    catalog.movie_details(movie_id),
                    catalog.movie_credits(movie_id),
                );
                match both.await {
                    Ok((details, credits)) => {
                        let _ = emit.send(Event::MovieDetailsReceived {
                            details,
                            cast: credits.cast,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Movie detail search failed: {e}");
                        let _ = emit.send(Event::MovieDetailsErrorReceived);
                    }
                }
            });
        }
        Command::StartTimer { duration } => {
            start_debounce(duration, emit, &effects.timers);
        }
        Command::RestartTimer { duration, timer_id } => {
            if let Some(timer_id) = timer_id {
                effects.timers.cancel(timer_id);
            }
            start_debounce(duration, emit, &effects.timers);
        }
        Command::CancelTimer { timer_id } => {
            if let Some(timer_id) = timer_id {
                effects.timers.cancel(timer_id);
            }
        }
    }
}

/// The registration event must sit in the queue before the sleep task
/// exists; a zero-length debounce must never enqueue its expiry first.
fn start_debounce(duration: Duration, emit: &EventSender, timers: &Timers) {
    let timer_id = timers.allocate();
    let _ = emit.send(Event::TimerIdReceived { timer_id });
    timers.arm(timer_id, duration);
}

/// Debounce timer service. Each armed timer is a sleep task that enqueues a
/// TimerExpired event unless cancelled first.
pub struct Timers {
    emit: EventSender,
    next_id: AtomicU64,
    active: Arc<Mutex<HashMap<TimerId, tokio::task::AbortHandle>>>,
}

impl Timers {
    pub fn new(emit: EventSender) -> Self {
        Self {
            emit,
            next_id: AtomicU64::new(1),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Issue a fresh handle. The timer does not run until armed.
    pub fn allocate(&self) -> TimerId {
        TimerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Arm the timer: after `duration`, a TimerExpired event is enqueued.
    pub fn arm(&self, timer_id: TimerId, duration: Duration) {
        let emit = self.emit.clone();
        let active = self.active.clone();
        // The table lock is held across the spawn so the sleep task cannot
        // observe the map before its own handle is inserted.
        let mut table = self.active.lock().unwrap();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            active.lock().unwrap().remove(&timer_id);
            let _ = emit.send(Event::TimerExpired);
        });
        table.insert(timer_id, task.abort_handle());
    }

    /// Cancel an armed timer. Unknown handles are ignored.
    pub fn cancel(&self, timer_id: TimerId) {
        match self.active.lock().unwrap().remove(&timer_id) {
            Some(task) => task.abort(),
            None => tracing::debug!("No armed timer for {timer_id}"),
        }
    }
}
