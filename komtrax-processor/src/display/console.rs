//! Console display sink used by the CLI
//!
//! Keeps the latest value of every slot across invocations and prints the
//! whole display, grouped like the UI, on every push.

use super::layout::GROUPS;
use super::{DisplaySink, DisplaySlot, DisplayValue};
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    values: BTreeMap<DisplaySlot, DisplayValue>,
    pushes: usize,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, slot: DisplaySlot) -> Option<&DisplayValue> {
        self.values.get(&slot)
    }

    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Render the display grouped by submodule; unset slots show `-`
    pub fn render(&self) -> String {
        let mut out = String::new();
        for group in GROUPS.iter() {
            let _ = writeln!(out, "[{}]", group.label);
            for slot in group.slots {
                let _ = writeln!(out, "  {}: {}", slot.label(), self.render_value(*slot));
            }
        }
        out
    }

    fn render_value(&self, slot: DisplaySlot) -> String {
        let Some(value) = self.values.get(&slot) else {
            return "-".to_string();
        };

        match (value.as_f64(), slot.precision()) {
            (Some(number), Some(precision)) => match slot.classify(number) {
                Some(range) => format!("{:.*} [{}]", precision, number, range.label),
                None => format!("{:.*}", precision, number),
            },
            _ => value.to_string(),
        }
    }
}

impl DisplaySink for ConsoleDisplay {
    fn update(&mut self, slot: DisplaySlot, value: DisplayValue) {
        debug!("display {} <- {}", slot, value);
        self.values.insert(slot, value);
    }

    fn push(&mut self) {
        self.pushes += 1;
        println!("{}", self.render());
    }
}
