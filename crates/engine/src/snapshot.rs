// Checkbox and dropdown state keyed by A1 address, as exchanged with the
// progress-sync collaborator.
//
// JSON form: `{"B2": true, "C4": "opt:Fire"}`. Applying a snapshot
// overwrites cells outright; there is no merging with local edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::cell_id::CellAddr;
use crate::infer::CellControl;
use crate::matrix::Matrix;
use crate::render::RenderPlan;

const OPTION_PREFIX: &str = "opt:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshotValue", into = "RawSnapshotValue")]
pub enum SnapshotValue {
    Checked(bool),
    Option(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSnapshotValue {
    Bool(bool),
    Text(String),
}

impl TryFrom<RawSnapshotValue> for SnapshotValue {
    type Error = String;

    fn try_from(raw: RawSnapshotValue) -> Result<Self, Self::Error> {
        match raw {
            RawSnapshotValue::Bool(b) => Ok(SnapshotValue::Checked(b)),
            RawSnapshotValue::Text(s) => s
                .strip_prefix(OPTION_PREFIX)
                .map(|v| SnapshotValue::Option(v.to_string()))
                .ok_or_else(|| format!("expected \"{OPTION_PREFIX}<value>\", got {s:?}")),
        }
    }
}

impl From<SnapshotValue> for RawSnapshotValue {
    fn from(value: SnapshotValue) -> Self {
        match value {
            SnapshotValue::Checked(b) => RawSnapshotValue::Bool(b),
            SnapshotValue::Option(v) => RawSnapshotValue::Text(format!("{OPTION_PREFIX}{v}")),
        }
    }
}

impl SnapshotValue {
    fn into_cell(self) -> CellValue {
        match self {
            SnapshotValue::Checked(b) => CellValue::Boolean(b),
            SnapshotValue::Option(v) => CellValue::from(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellSnapshot {
    pub cells: BTreeMap<String, SnapshotValue>,
}

impl CellSnapshot {
    /// Gather the state of every checkbox and dropdown in a plan.
    pub fn collect(plan: &RenderPlan) -> Self {
        let mut cells = BTreeMap::new();
        for row in &plan.rows {
            for cell in row.cells() {
                let value = match &cell.control {
                    CellControl::Checkbox { checked } => SnapshotValue::Checked(*checked),
                    CellControl::Dropdown { selected, .. } => SnapshotValue::Option(selected.clone()),
                    _ => continue,
                };
                cells.insert(CellAddr::new(row.index, cell.col).to_string(), value);
            }
        }
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Write every entry into the matrix. Returns how many were applied.
    /// Entries outside the current sheet are skipped; a snapshot never grows
    /// the matrix.
    pub fn apply(&self, matrix: &mut Matrix) -> usize {
        let mut applied = 0;
        for (key, value) in &self.cells {
            let addr = match key.parse::<CellAddr>() {
                Ok(addr) => addr,
                Err(e) => {
                    log::warn!("skipping snapshot entry {key:?}: {e}");
                    continue;
                }
            };
            if addr.row == 0 {
                log::warn!("skipping snapshot entry {key:?}: header row");
                continue;
            }
            if addr.row >= matrix.row_count() || addr.col >= matrix.column_count() {
                log::warn!(
                    "skipping snapshot entry {key:?}: outside {}x{} sheet",
                    matrix.row_count(),
                    matrix.column_count()
                );
                continue;
            }
            matrix.set(addr.row, addr.col, value.clone().into_cell());
            applied += 1;
        }
        applied
    }
}
