//! Linear-scan register allocation (Poletto & Sarkar) over the intervals
//! produced by [`crate::regalloc::liveness::LivenessAnalyzer`].

use std::collections::HashMap;

use crate::entity::NodeId;
use crate::regalloc::liveness::{LiveInterval, LivenessAnalyzer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Register { index: u32, name: String },
    Stack { index: u32, name: String },
}

impl Location {
    pub fn is_register(&self) -> bool {
        matches!(self, Location::Register { .. })
    }

    pub fn index(&self) -> u32 {
        match self {
            Location::Register { index, .. } | Location::Stack { index, .. } => *index,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Location::Register { name, .. } | Location::Stack { name, .. } => name,
        }
    }
}

pub struct LinearScanRegAlloc {
    locations: HashMap<NodeId, Location>,
    num_stack_slots: u32,
}

struct Active {
    value: NodeId,
    end: u32,
    reg: u32,
}

impl LinearScanRegAlloc {
    pub fn run(liveness: &LivenessAnalyzer, num_registers: u32) -> Self {
        Self::run_with_names(liveness, num_registers, "x", "s")
    }

    pub fn run_with_names(
        liveness: &LivenessAnalyzer,
        num_registers: u32,
        register_name_prefix: &str,
        spill_slot_name_prefix: &str,
    ) -> Self {
        let mut intervals: Vec<(NodeId, LiveInterval)> = liveness
            .intervals()
            .iter()
            .map(|(&v, iv)| (v, iv.clone()))
            .filter(|(_, iv)| !iv.is_zero_length())
            .collect();
        intervals.sort_by_key(|(_, iv)| iv.begin());

        // LIFO: whichever register was freed most recently is handed out
        // next, so a hot loop tends to keep reusing the same physical slot.
        let mut free_pool: Vec<u32> = (0..num_registers).collect();
        let mut active: Vec<Active> = Vec::new();
        let mut locations = HashMap::new();
        let mut num_stack_slots = 0u32;

        for (value, interval) in intervals {
            let begin = interval.begin();

            let mut i = 0;
            while i < active.len() {
                if active[i].end <= begin {
                    free_pool.push(active[i].reg);
                    active.remove(i);
                } else {
                    i += 1;
                }
            }

            if let Some(reg) = free_pool.pop() {
                locations.insert(value, register_location(register_name_prefix, reg));
                active.push(Active { value, end: interval.end(), reg });
                active.sort_by_key(|a| a.end);
                continue;
            }

            // No free register: spill whichever interval (the new one, or
            // the active one with the furthest-reaching tail) frees the
            // most future pressure.
            let longest_active = active.iter().enumerate().max_by_key(|(_, a)| a.end);
            match longest_active {
                Some((idx, a)) if a.end > interval.end() => {
                    let reg = a.reg;
                    let spilled_value = a.value;
                    locations.insert(spilled_value, stack_location(spill_slot_name_prefix, num_stack_slots));
                    num_stack_slots += 1;
                    active.remove(idx);
                    locations.insert(value, register_location(register_name_prefix, reg));
                    active.push(Active { value, end: interval.end(), reg });
                    active.sort_by_key(|a| a.end);
                }
                _ => {
                    locations.insert(value, stack_location(spill_slot_name_prefix, num_stack_slots));
                    num_stack_slots += 1;
                }
            }
        }

        LinearScanRegAlloc { locations, num_stack_slots }
    }

    pub fn location(&self, value: NodeId) -> Option<Location> {
        self.locations.get(&value).cloned()
    }

    pub fn num_stack_slots(&self) -> u32 {
        self.num_stack_slots
    }
}

fn register_location(prefix: &str, index: u32) -> Location {
    Location::Register { index, name: format!("{prefix}{index}") }
}

fn stack_location(prefix: &str, index: u32) -> Location {
    Location::Stack { index, name: format!("{prefix}{}", index + 1) }
}
