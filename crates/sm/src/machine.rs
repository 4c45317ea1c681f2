//! The run-to-completion dispatch engine.

use heapless::Vec;

use reakt_core::{Event, Outcome, Priority, Signal};
use reakt_trc::{Record, SmRecord, Tracer};

use crate::state::{
    Branch, History, HistoryKind, State, StateAction, StateKind, Target, Trans, TransAction,
    Vertex,
};
use crate::{MAX_HISTORY_SLOTS, MAX_STATE_DEPTH, MAX_TRANS_SEGMENTS};

/// Root-to-state chain, bounded by the nesting limit.
type Path<C> = Vec<&'static State<C>, MAX_STATE_DEPTH>;

/// Immutable description of one state machine: its name, the state the
/// top-level initial transition targets, and the effect that runs with it.
pub struct MachineDef<C: 'static> {
    pub name: &'static str,
    pub initial: &'static State<C>,
    pub initial_action: Option<StateAction<C>>,
}

/// A live state-machine instance.
///
/// Holds the only mutable pieces: the current state pointer and the history
/// store (one slot per history pseudostate in the graph). The context `C`
/// is owned by the caller and threaded through every operation, so actions
/// can mutate application data without the machine borrowing it.
pub struct Machine<C: 'static> {
    def: &'static MachineDef<C>,
    owner: Priority,
    current: Option<&'static State<C>>,
    history: [Option<&'static State<C>>; MAX_HISTORY_SLOTS],
}

impl<C> Machine<C> {
    pub fn new(def: &'static MachineDef<C>) -> Self {
        Self {
            def,
            owner: Priority::MIN,
            current: None,
            history: [None; MAX_HISTORY_SLOTS],
        }
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// Priority used to tag this machine's trace records.
    pub fn set_owner(&mut self, owner: Priority) {
        self.owner = owner;
    }

    /// Current stable state; `None` before [`Machine::init`].
    pub fn current(&self) -> Option<&'static State<C>> {
        self.current
    }

    /// Whether the machine reached a final state.
    pub fn is_completed(&self) -> bool {
        self.current.is_some_and(State::is_final)
    }

    /// Stored state of a history pseudostate.
    pub fn history_of(&self, hist: &History<C>) -> Option<&'static State<C>> {
        self.history.get(hist.slot).copied().flatten()
    }

    /// Reset a history slot to empty.
    pub fn clear_history(&mut self, hist: &History<C>) {
        if hist.slot < MAX_HISTORY_SLOTS {
            self.history[hist.slot] = None;
        }
    }

    /// Load a history slot, as if `state` had been the last active substate.
    pub fn set_history(&mut self, hist: &History<C>, state: &'static State<C>) {
        if hist.slot < MAX_HISTORY_SLOTS {
            self.history[hist.slot] = Some(state);
        }
    }

    /// Run the top-level initial transition and settle in the first stable
    /// basic state.
    pub fn init(&mut self, ctx: &mut C, tracer: &Tracer) -> Outcome {
        tracer.emit(Record::Sm(SmRecord::Init {
            prio: self.owner,
            state: self.def.initial.name,
        }));
        if let Some(action) = self.def.initial_action {
            action(ctx);
        }
        let path = match self.path_from_root(self.def.initial) {
            Ok(path) => path,
            Err(outcome) => return self.fail(tracer, Signal::default(), outcome),
        };
        for state in &path {
            self.enter(ctx, tracer, state);
        }
        let settled = match self.descend(ctx, tracer, self.def.initial) {
            Ok((state, _, _)) => state,
            Err(outcome) => return self.fail(tracer, Signal::default(), outcome),
        };
        self.current = Some(settled);
        tracer.emit(Record::Sm(SmRecord::Current {
            prio: self.owner,
            state: settled.name,
        }));
        Outcome::Initialized
    }

    /// Execute one run-to-completion step for `event`.
    pub fn dispatch(&mut self, ctx: &mut C, event: &Event, tracer: &Tracer) -> Outcome {
        let Some(current) = self.current else {
            return self.fail(tracer, event.signal(), Outcome::UnknownState);
        };
        tracer.emit(Record::Sm(SmRecord::Dispatch {
            prio: self.owner,
            signal: event.signal(),
            state: current.name,
        }));

        // Trigger search: innermost state wins; a false guard keeps the
        // search going, first within the same table, then upward.
        let mut guard_rejected = false;
        let mut found: Option<(&'static State<C>, &'static Trans<C>)> = None;
        let mut scan = Some(current);
        'search: while let Some(state) = scan {
            for trans in state.transitions {
                if trans.signal != event.signal() {
                    continue;
                }
                if let Some(guard) = trans.guard {
                    if !guard(ctx, event) {
                        guard_rejected = true;
                        continue;
                    }
                }
                found = Some((state, trans));
                break 'search;
            }
            scan = state.parent;
        }
        let Some((source, trans)) = found else {
            let outcome = if guard_rejected {
                Outcome::GuardFalse
            } else {
                Outcome::NotFound
            };
            return self.fail(tracer, event.signal(), outcome);
        };

        let first = match &trans.target {
            Target::Internal => {
                let mut actions = 0;
                if let Some(action) = trans.action {
                    action(ctx, event);
                    actions = 1;
                }
                tracer.emit(Record::Sm(SmRecord::Counts {
                    prio: self.owner,
                    exits: 0,
                    entries: 0,
                    actions,
                }));
                tracer.emit(Record::Sm(SmRecord::Current {
                    prio: self.owner,
                    state: current.name,
                }));
                return self.complete(tracer, event.signal());
            }
            Target::To(vertex) => *vertex,
        };

        // Resolve the compound target through pseudostate segments before
        // any effect runs, so a resolution failure leaves the state intact.
        let mut actions: Vec<TransAction<C>, { MAX_TRANS_SEGMENTS + 1 }> = Vec::new();
        if let Some(action) = trans.action {
            if actions.push(action).is_err() {
                return self.fail(tracer, event.signal(), Outcome::ExTransitionSegments);
            }
        }
        let main_target = match self.resolve(ctx, event, first, &mut actions) {
            Ok(target) => target,
            Err(outcome) => return self.fail(tracer, event.signal(), outcome),
        };

        let source_path = match self.path_from_root(source) {
            Ok(path) => path,
            Err(outcome) => return self.fail(tracer, event.signal(), outcome),
        };
        let target_path = match self.path_from_root(main_target) {
            Ok(path) => path,
            Err(outcome) => return self.fail(tracer, event.signal(), outcome),
        };

        // Self-transitions exit and re-enter their state.
        let lca = if source.same(main_target) {
            source.parent
        } else {
            let mut lca = None;
            for (a, b) in source_path.iter().zip(target_path.iter()) {
                if core::ptr::eq(*a, *b) {
                    lca = Some(*a);
                } else {
                    break;
                }
            }
            lca
        };

        let mut exit_chain: Path<C> = Vec::new();
        let mut walk = current;
        loop {
            if let Some(stop) = lca {
                if walk.same(stop) {
                    break;
                }
            }
            if exit_chain.push(walk).is_err() {
                return self.fail(tracer, event.signal(), Outcome::ExHierarchyLevel);
            }
            match walk.parent {
                Some(parent) => walk = parent,
                None => break,
            }
        }

        let entries: &[&'static State<C>] = match lca {
            Some(stop) => match target_path.iter().position(|s| s.same(stop)) {
                Some(pos) => &target_path[pos + 1..],
                None => &target_path[..],
            },
            None => &target_path[..],
        };

        tracer.emit(Record::Sm(SmRecord::Transition {
            prio: self.owner,
            source: source.name,
            target: main_target.name,
        }));

        // Exit chain, innermost first, capturing history on the way out.
        let leaf = current;
        for (idx, exited) in exit_chain.iter().enumerate() {
            if let StateKind::Composite {
                history: Some(hist),
                ..
            } = exited.kind
            {
                let remembered = match hist.kind {
                    HistoryKind::Shallow => idx.checked_sub(1).map(|i| exit_chain[i]),
                    HistoryKind::Deep => Some(leaf),
                };
                if let Some(state) = remembered {
                    if hist.slot < MAX_HISTORY_SLOTS {
                        self.history[hist.slot] = Some(state);
                    }
                }
            }
            tracer.emit(Record::Sm(SmRecord::StateExit {
                prio: self.owner,
                state: exited.name,
            }));
            if let Some(exit) = exited.exit {
                exit(ctx);
            }
        }

        // Transition actions in collected order: trigger first, then the
        // pseudostate segments.
        for action in &actions {
            action(ctx, event);
        }

        // Entry chain, outermost first.
        for state in entries {
            self.enter(ctx, tracer, state);
        }

        // Initial descent into a composite main target.
        let (settled, descent_entries, descent_actions) =
            match self.descend(ctx, tracer, main_target) {
                Ok(result) => result,
                Err(outcome) => return self.fail(tracer, event.signal(), outcome),
            };

        self.current = Some(settled);
        tracer.emit(Record::Sm(SmRecord::Counts {
            prio: self.owner,
            exits: exit_chain.len() as u8,
            entries: entries.len() as u8 + descent_entries,
            actions: actions.len() as u8 + descent_actions,
        }));
        tracer.emit(Record::Sm(SmRecord::Current {
            prio: self.owner,
            state: settled.name,
        }));
        self.complete(tracer, event.signal())
    }

    /// Follow pseudostate segments until a state is reached.
    fn resolve(
        &self,
        ctx: &mut C,
        event: &Event,
        first: &'static Vertex<C>,
        actions: &mut Vec<TransAction<C>, { MAX_TRANS_SEGMENTS + 1 }>,
    ) -> Result<&'static State<C>, Outcome> {
        let mut vertex = first;
        let mut segments = 0;
        loop {
            segments += 1;
            if segments > MAX_TRANS_SEGMENTS {
                return Err(Outcome::ExTransitionSegments);
            }
            match *vertex {
                Vertex::State(state) => return Ok(state),
                Vertex::Choice(choice) => {
                    let branch = Self::pick_branch(ctx, event, choice.branches)
                        .ok_or(Outcome::CndNotFound)?;
                    if let Some(action) = branch.action {
                        actions
                            .push(action)
                            .map_err(|_| Outcome::ExTransitionSegments)?;
                    }
                    vertex = branch.target;
                }
                Vertex::Junction(junction) => {
                    if let Some(action) = junction.action {
                        actions
                            .push(action)
                            .map_err(|_| Outcome::ExTransitionSegments)?;
                    }
                    vertex = junction.target;
                }
                Vertex::History(hist) => {
                    if let Some(saved) = self.history.get(hist.slot).copied().flatten() {
                        return Ok(saved);
                    }
                    if let Some(default) = hist.default {
                        vertex = default;
                        continue;
                    }
                    match hist.parent.kind {
                        StateKind::Composite { default, .. } => return Ok(default),
                        _ => return Err(Outcome::UnknownState),
                    }
                }
            }
        }
    }

    /// Guarded branches are tried in table order; the unguarded branch is
    /// the default, taken only when every guard refuses.
    fn pick_branch(
        ctx: &C,
        event: &Event,
        branches: &'static [Branch<C>],
    ) -> Option<&'static Branch<C>> {
        for branch in branches {
            if let Some(guard) = branch.guard {
                if guard(ctx, event) {
                    return Some(branch);
                }
            }
        }
        branches.iter().find(|branch| branch.guard.is_none())
    }

    /// Take default initial transitions until a non-composite state is
    /// reached. Returns the settled state plus entry/action counts.
    fn descend(
        &self,
        ctx: &mut C,
        tracer: &Tracer,
        from: &'static State<C>,
    ) -> Result<(&'static State<C>, u8, u8), Outcome> {
        let mut state = from;
        let mut entries = 0;
        let mut actions = 0;
        let mut depth = 0;
        while let StateKind::Composite {
            default,
            initial_action,
            ..
        } = state.kind
        {
            depth += 1;
            if depth > MAX_STATE_DEPTH {
                return Err(Outcome::ExHierarchyLevel);
            }
            if let Some(action) = initial_action {
                action(ctx);
                actions += 1;
            }
            self.enter(ctx, tracer, default);
            entries += 1;
            state = default;
        }
        Ok((state, entries, actions))
    }

    fn enter(&self, ctx: &mut C, tracer: &Tracer, state: &State<C>) {
        tracer.emit(Record::Sm(SmRecord::StateEntry {
            prio: self.owner,
            state: state.name,
        }));
        if let Some(entry) = state.entry {
            entry(ctx);
        }
    }

    fn complete(&self, tracer: &Tracer, signal: Signal) -> Outcome {
        tracer.emit(Record::Sm(SmRecord::Outcome {
            prio: self.owner,
            signal,
            outcome: Outcome::Processed,
        }));
        Outcome::Processed
    }

    fn fail(&self, tracer: &Tracer, signal: Signal, outcome: Outcome) -> Outcome {
        tracer.emit(Record::Sm(SmRecord::Outcome {
            prio: self.owner,
            signal,
            outcome,
        }));
        outcome
    }

    fn path_from_root(&self, state: &'static State<C>) -> Result<Path<C>, Outcome> {
        let mut path: Path<C> = Vec::new();
        let mut cursor = Some(state);
        while let Some(state) = cursor {
            if path.push(state).is_err() {
                return Err(Outcome::ExHierarchyLevel);
            }
            cursor = state.parent;
        }
        path.as_mut_slice().reverse();
        Ok(path)
    }
}
