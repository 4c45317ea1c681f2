mod fixture;

use reakt_trc::{Group, Record, RecordLog, SmRecord, Tracer};

use crate::machine::{Machine, MachineDef};
use fixture::Ctx;

/// Machine plus a tracer wired to an in-memory log with SM records enabled.
fn harness(def: &'static MachineDef<Ctx>) -> (Machine<Ctx>, Ctx, Tracer, RecordLog) {
    let machine = Machine::new(def);
    let ctx = Ctx::default();
    let tracer = Tracer::new();
    let log = RecordLog::new();
    tracer.set_hook(log.hook());
    tracer.configure(|f| f.enable_group(Group::Sm));
    (machine, ctx, tracer, log)
}

fn entry_names(records: &[Record]) -> Vec<&'static str> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::Sm(SmRecord::StateEntry { state, .. }) => Some(*state),
            _ => None,
        })
        .collect()
}

fn exit_names(records: &[Record]) -> Vec<&'static str> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::Sm(SmRecord::StateExit { state, .. }) => Some(*state),
            _ => None,
        })
        .collect()
}

fn transition_pairs(records: &[Record]) -> Vec<(&'static str, &'static str)> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::Sm(SmRecord::Transition { source, target, .. }) => Some((*source, *target)),
            _ => None,
        })
        .collect()
}
