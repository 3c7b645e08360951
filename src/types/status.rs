// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// The scheduling phase of an item.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Never reviewed.
    #[default]
    New,
    /// On the intraday learning ladder for the first time.
    Learning,
    /// Scheduled on a daily cadence.
    Reviewing,
    /// Back on the learning ladder after a lapse.
    Relearning,
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Reviewing => "reviewing",
            Status::Relearning => "relearning",
        }
    }

    /// Whether the item is on the learning ladder.
    pub fn is_learning(self) -> bool {
        matches!(self, Status::Learning | Status::Relearning)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Status {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "new" => Ok(Status::New),
            "learning" => Ok(Status::Learning),
            "reviewing" => Ok(Status::Reviewing),
            "relearning" => Ok(Status::Relearning),
            // Older data persisted a "mastered" status. Mastery is derived
            // from the interval now, so treat it as a reviewing item.
            "mastered" => Ok(Status::Reviewing),
            _ => fail(format!("invalid status: {value}")),
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Status::try_from(string.as_str()).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
