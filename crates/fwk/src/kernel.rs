//! The cooperative fixed-priority kernel.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use thiserror::Error as ThisError;

use reakt_core::{Error, Priority};
use reakt_sm::MachineDef;
use reakt_trc::{AoRecord, FwkRecord, Record, Tracer};

use crate::active::{Active, Agent};
use crate::framework::Framework;
use crate::hooks::{DefaultPlatform, Platform};

#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub name: &'static str,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self { name: "reakt" }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum KernelError {
    #[error("no active object at {0}")]
    NotFound(Priority),
    #[error("{0}")]
    Core(#[from] Error),
}

/// Staged kernel construction: active objects register with a distinct
/// priority and a queue capacity, then [`KernelBuilder::build`] freezes the
/// set.
pub struct KernelBuilder {
    config: KernelConfig,
    framework: Arc<Framework>,
    agents: Vec<Option<Box<dyn Agent>>>,
    platform: Box<dyn Platform>,
}

impl KernelBuilder {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            framework: Framework::new(),
            agents: (0..Priority::MAX.raw()).map(|_| None).collect(),
            platform: Box::new(DefaultPlatform),
        }
    }

    /// The framework context, available up front so application contexts
    /// can capture it before registration.
    pub fn framework(&self) -> Arc<Framework> {
        Arc::clone(&self.framework)
    }

    pub fn with_platform(mut self, platform: Box<dyn Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_trace_hook(self, hook: reakt_trc::Hook) -> Self {
        self.framework.tracer().set_hook(hook);
        self
    }

    /// Register a state machine plus its context as an active object.
    pub fn register<C: Send + 'static>(
        self,
        def: &'static MachineDef<C>,
        ctx: C,
        priority: Priority,
        queue_capacity: usize,
    ) -> Result<Self, KernelError> {
        self.register_agent(Box::new(Active::new(def, ctx)), priority, queue_capacity)
    }

    /// Register a hand-rolled [`Agent`] implementation.
    pub fn register_agent(
        mut self,
        mut agent: Box<dyn Agent>,
        priority: Priority,
        queue_capacity: usize,
    ) -> Result<Self, KernelError> {
        if self.agents[priority.index()].is_some() {
            return Err(Error::PriorityInUse.into());
        }
        self.framework.attach_queue(priority, queue_capacity)?;
        agent.bind(priority);
        self.framework.tracer().emit(Record::Ao(AoRecord::Registered {
            prio: priority,
            name: agent.name(),
        }));
        self.agents[priority.index()] = Some(agent);
        Ok(self)
    }

    pub fn build(self) -> Kernel {
        Kernel {
            config: self.config,
            framework: self.framework,
            agents: self.agents,
            platform: self.platform,
            started: false,
        }
    }
}

/// The single logical execution context driving all active objects.
///
/// Selection is strict priority: among the objects with pending events, the
/// highest priority gets the next run-to-completion step. Steps never
/// preempt each other; producers only ever enqueue.
pub struct Kernel {
    config: KernelConfig,
    framework: Arc<Framework>,
    agents: Vec<Option<Box<dyn Agent>>>,
    platform: Box<dyn Platform>,
    started: bool,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> KernelBuilder {
        KernelBuilder::new(config)
    }

    pub fn name(&self) -> &'static str {
        self.config.name
    }

    pub fn framework(&self) -> Arc<Framework> {
        Arc::clone(&self.framework)
    }

    pub fn tracer(&self) -> Tracer {
        self.framework.tracer().clone()
    }

    /// Run every registered object's initial transition, in priority order
    /// from lowest to highest. Idempotent.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.platform.on_start();
        let tracer = self.tracer();
        tracer.emit(Record::Fwk(FwkRecord::Started));
        for idx in 0..self.agents.len() {
            if let Some(agent) = self.agents[idx].as_mut() {
                agent.init(&tracer);
                tracer.emit(Record::Ao(AoRecord::Activated {
                    prio: Priority::new_unchecked(idx as u8 + 1),
                    state: agent.current_state().unwrap_or("?"),
                }));
            }
        }
    }

    /// Drive run-to-completion steps until every active object has
    /// terminated, idling through the platform hook when nothing is ready.
    pub fn run(&mut self) -> Result<(), KernelError> {
        self.start();
        loop {
            if !self.dispatch_once()? {
                if self.all_terminated() {
                    break;
                }
                self.platform.on_idle();
            }
        }
        self.platform.on_exit();
        self.tracer().emit(Record::Fwk(FwkRecord::Exited));
        Ok(())
    }

    /// Drive run-to-completion steps until no object has a pending event.
    pub fn run_until_idle(&mut self) -> Result<(), KernelError> {
        self.start();
        while self.dispatch_once()? {}
        Ok(())
    }

    /// One scheduling decision: dequeue for the highest-priority ready
    /// object, dispatch outside the critical section, recycle the event.
    /// Returns whether a step ran.
    pub fn dispatch_once(&mut self) -> Result<bool, KernelError> {
        let Some((prio, ev, event)) = self.framework.take_next()? else {
            return Ok(false);
        };
        let Some(agent) = self.agents[prio.index()].as_mut() else {
            self.framework.recycle(ev)?;
            return Err(KernelError::NotFound(prio));
        };
        let tracer = self.framework.tracer().clone();
        let _outcome = agent.dispatch(&event, &tracer);
        let completed = agent.is_completed();
        self.framework.recycle(ev)?;
        if completed {
            self.terminate(prio)?;
        }
        Ok(true)
    }

    /// Remove the object at `prio`, flushing and recycling its queue.
    pub fn terminate(&mut self, prio: Priority) -> Result<(), KernelError> {
        if self.agents[prio.index()].take().is_none() {
            return Err(KernelError::NotFound(prio));
        }
        self.framework.detach_queue(prio)?;
        self.framework
            .tracer()
            .emit(Record::Ao(AoRecord::Terminated { prio }));
        Ok(())
    }

    pub fn is_registered(&self, prio: Priority) -> bool {
        self.agents[prio.index()].is_some()
    }

    fn all_terminated(&self) -> bool {
        self.agents.iter().all(Option::is_none)
    }
}
