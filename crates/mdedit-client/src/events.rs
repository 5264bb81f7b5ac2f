use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Events the view layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    NoticeShown { id: u64, message: String },
    NoticeDismissed { id: u64 },
    DocumentSaved { uuid: Uuid },
    SaveFailed { uuid: Uuid },
}

pub type EventSender = broadcast::Sender<AppEvent>;

pub fn event_channel() -> EventSender {
    broadcast::channel(64).0
}

pub fn emit_event(events: &EventSender, event: AppEvent) {
    if events.send(event).is_err() {
        tracing::trace!("No event subscribers");
    }
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Shows at most one notice at a time and dismisses it after a delay.
pub struct Notifier {
    current: Arc<Mutex<Option<Notice>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    events: EventSender,
}

impl Notifier {
    pub fn new(events: EventSender) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    pub fn current(&self) -> Option<Notice> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    /// Replace the current notice and schedule its dismissal.
    pub fn show(&self, message: impl Into<String>, duration: Duration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notice = Notice {
            id,
            message: message.into(),
        };

        self.abort_timer();
        if let Ok(mut current) = self.current.lock() {
            *current = Some(notice.clone());
        }
        emit_event(
            &self.events,
            AppEvent::NoticeShown {
                id,
                message: notice.message,
            },
        );

        let current = self.current.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let expired = match current.lock() {
                Ok(mut c) if c.as_ref().is_some_and(|n| n.id == id) => {
                    *c = None;
                    true
                }
                _ => false,
            };
            if expired {
                emit_event(&events, AppEvent::NoticeDismissed { id });
            }
        });

        if let Ok(mut timer) = self.timer.lock() {
            *timer = Some(handle);
        }
        id
    }

    /// Dismiss the current notice now. Returns `false` if none was showing.
    pub fn dismiss(&self) -> bool {
        self.abort_timer();
        let taken = self.current.lock().ok().and_then(|mut c| c.take());
        match taken {
            Some(notice) => {
                emit_event(&self.events, AppEvent::NoticeDismissed { id: notice.id });
                true
            }
            None => false,
        }
    }

    fn abort_timer(&self) {
        if let Some(handle) = self.timer.lock().ok().and_then(|mut t| t.take()) {
            handle.abort();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(3000);

    #[tokio::test(start_paused = true)]
    async fn test_notice_auto_dismisses() {
        let events = event_channel();
        let mut rx = events.subscribe();
        let notifier = Notifier::new(events);

        let id = notifier.show("Document deleted successfully!", SHORT);
        assert_eq!(notifier.current().unwrap().id, id);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert!(notifier.current().is_none());

        assert!(matches!(rx.recv().await.unwrap(), AppEvent::NoticeShown { .. }));
        assert_eq!(rx.recv().await.unwrap(), AppEvent::NoticeDismissed { id });
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_dismiss_cancels_timer() {
        let events = event_channel();
        let mut rx = events.subscribe();
        let notifier = Notifier::new(events);

        let id = notifier.show("bye", SHORT);
        assert!(notifier.dismiss());
        assert!(!notifier.dismiss());

        tokio::time::sleep(SHORT * 2).await;

        assert!(matches!(rx.recv().await.unwrap(), AppEvent::NoticeShown { .. }));
        assert_eq!(rx.recv().await.unwrap(), AppEvent::NoticeDismissed { id });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notice_restarts_the_clock() {
        let notifier = Notifier::new(event_channel());

        notifier.show("first", SHORT);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let second = notifier.show("second", SHORT);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(notifier.current().unwrap().id, second);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert!(notifier.current().is_none());
    }
}
