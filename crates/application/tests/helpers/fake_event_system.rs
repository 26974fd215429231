use ferrous_dnsperf_application::ports::{Direction, EventSystem, ReadinessHandler, Token};
use ferrous_dnsperf_domain::DomainError;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::os::fd::RawFd;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct FakeEventState {
    interests: HashMap<(RawFd, Direction), Token>,
    ready: VecDeque<(RawFd, Direction)>,
    cleared: Vec<(RawFd, Direction)>,
    /// Descriptor bound; unbounded when unset
    capacity: Option<usize>,
}

/// In-memory event system. Readiness is injected with [`mark_ready`];
/// `dispatch` never sleeps.
///
/// Clones share state, so a test keeps one handle after boxing the other
/// into the engine.
///
/// [`mark_ready`]: FakeEventSystem::mark_ready
#[derive(Clone, Default)]
pub struct FakeEventSystem {
    state: Rc<RefCell<FakeEventState>>,
}

impl FakeEventSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let events = Self::default();
        events.state.borrow_mut().capacity = Some(capacity);
        events
    }

    pub fn boxed(&self) -> Box<dyn EventSystem> {
        Box::new(self.clone())
    }

    pub fn mark_ready(&self, fd: RawFd, direction: Direction) {
        self.state.borrow_mut().ready.push_back((fd, direction));
    }

    pub fn is_watching(&self, fd: RawFd, direction: Direction) -> bool {
        self.state.borrow().interests.contains_key(&(fd, direction))
    }

    pub fn interest_count(&self) -> usize {
        self.state.borrow().interests.len()
    }

    /// Interests removed through `clear_interest`, in order
    pub fn cleared(&self) -> Vec<(RawFd, Direction)> {
        self.state.borrow().cleared.clone()
    }
}

impl EventSystem for FakeEventSystem {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn capacity(&self) -> usize {
        self.state.borrow().capacity.unwrap_or(usize::MAX)
    }

    fn set_interest(
        &mut self,
        fd: RawFd,
        direction: Direction,
        token: Token,
    ) -> Result<(), DomainError> {
        self.state
            .borrow_mut()
            .interests
            .insert((fd, direction), token);
        Ok(())
    }

    fn clear_interest(&mut self, fd: RawFd, direction: Direction) -> Result<(), DomainError> {
        let mut state = self.state.borrow_mut();
        if state.interests.remove(&(fd, direction)).is_some() {
            state.cleared.push((fd, direction));
        }
        Ok(())
    }

    fn is_interested(&self, fd: RawFd, direction: Direction) -> bool {
        self.is_watching(fd, direction)
    }

    fn dispatch(
        &mut self,
        _timeout: Duration,
        handler: &mut dyn ReadinessHandler,
    ) -> Result<usize, DomainError> {
        let ready: Vec<_> = self.state.borrow_mut().ready.drain(..).collect();
        let mut delivered = 0;

        for (fd, direction) in ready {
            let token = self.state.borrow_mut().interests.remove(&(fd, direction));
            let Some(token) = token else {
                continue;
            };
            delivered += 1;
            match direction {
                Direction::Write => handler.on_writable(self, token),
                Direction::Read => handler.on_readable(self, token),
            }
        }

        Ok(delivered)
    }
}
