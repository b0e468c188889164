use std::{
    fmt::{Debug, Display},
    io,
    str::FromStr,
};

use thiserror::Error;

use crate::{algo::Plan, env::LayeredState, gym::OrchardState};

/// Errors raised while writing or reading tabular plan records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("malformed record {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A state that can be written as a fixed set of named fields
pub trait Record: Sized {
    /// Column names of the state's fields
    const FIELDS: &'static [&'static str];

    fn to_fields(&self) -> Vec<String>;

    /// Parse a state back from its fields, or `None` if they are invalid
    fn from_fields(fields: &[&str]) -> Option<Self>;
}

impl Record for OrchardState {
    const FIELDS: &'static [&'static str] = &["t", "b", "o"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.t.to_string(),
            u8::from(self.bridge).to_string(),
            u8::from(self.orchard).to_string(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let flag = |s: &str| match s {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        };
        match fields {
            [t, b, o] => Some(Self::new(t.parse().ok()?, flag(b)?, flag(o)?)),
            _ => None,
        }
    }
}

/// One row of the tabular format: a state, its value, and its action if it is a decision state
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecord<S, A> {
    pub state: S,
    pub value: f64,
    pub action: Option<A>,
}

impl<S: LayeredState, A: Copy + Ord + Debug> Plan<S, A> {
    /// The plan as records, one per state in index order
    pub fn records(&self) -> Vec<PlanRecord<S, A>> {
        self.values()
            .iter()
            .map(|(&state, &value)| PlanRecord {
                state,
                value,
                action: self.action(&state),
            })
            .collect()
    }
}

/// Write a plan as CSV with one row per state, keyed by the state's fields
///
/// The output is deterministic: rows follow index order and values use the shortest
/// representation that parses back to the same number.
pub fn write_plan<S, A, W>(plan: &Plan<S, A>, writer: W) -> Result<(), ExportError>
where
    S: LayeredState + Record,
    A: Copy + Ord + Debug + Display,
    W: io::Write,
{
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = S::FIELDS.to_vec();
    header.extend(["value", "action"]);
    wtr.write_record(&header)?;

    for record in plan.records() {
        let mut row = record.state.to_fields();
        row.push(record.value.to_string());
        row.push(record.action.map(|a| a.to_string()).unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read records written by [`write_plan`]
pub fn read_plan<S, A, R>(reader: R) -> Result<Vec<PlanRecord<S, A>>, ExportError>
where
    S: Record,
    A: FromStr,
    R: io::Read,
{
    let mut rdr = csv::Reader::from_reader(reader);
    let width = S::FIELDS.len();
    let mut records = Vec::new();

    for (line, row) in rdr.records().enumerate() {
        let row = row?;
        let malformed = |reason: &str| ExportError::Malformed {
            line: line + 1,
            reason: reason.to_string(),
        };
        if row.len() != width + 2 {
            return Err(malformed("wrong number of fields"));
        }

        let fields = row.iter().take(width).collect::<Vec<_>>();
        let state = S::from_fields(&fields).ok_or_else(|| malformed("invalid state"))?;
        let value = row[width]
            .parse::<f64>()
            .map_err(|_| malformed("invalid value"))?;
        let action = match &row[width + 1] {
            "" => None,
            a => Some(a.parse::<A>().map_err(|_| malformed("invalid action"))?),
        };

        records.push(PlanRecord {
            state,
            value,
            action,
        });
    }

    Ok(records)
}
