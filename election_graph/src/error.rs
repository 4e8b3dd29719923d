use snafu::prelude::*;

/// Errors that prevent a snapshot from being reconciled.
///
/// Any of these aborts the whole version: no partial graph is handed out.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReconcileError {
    #[snafu(display("Malformed fragment ({scope}): missing required field {field}"))]
    MalformedFragment { scope: String, field: String },

    #[snafu(display("Malformed fragment ({scope}): field {field} is not a valid number: {value}"))]
    InvalidNumber {
        scope: String,
        field: String,
        value: String,
    },

    #[snafu(display("Could not parse the {payload} payload"))]
    PayloadSyntax {
        payload: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unrecognized election date {value:?}"))]
    InvalidElectionDate { value: String },

    #[snafu(display("County {name} appears more than once in the snapshot"))]
    DuplicateCounty { name: String },

    #[snafu(display("County {name} was added after the statewide offices"))]
    CountyAfterStatewide { name: String },
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
