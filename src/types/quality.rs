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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// The user's self-assessed recall for one review.
///
/// The discriminants are the values on the classical 0-5 SM-2 scale. Only
/// these four are accepted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Again = 0,
    Hard = 3,
    Good = 4,
    Easy = 5,
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Quality::Again => "again",
            Quality::Hard => "hard",
            Quality::Good => "good",
            Quality::Easy => "easy",
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_pass(self) -> bool {
        self.value() >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Again),
            3 => Ok(Quality::Hard),
            4 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            _ => fail(format!(
                "invalid quality: {value} (expected 0, 3, 4, or 5)"
            )),
        }
    }
}

impl ToSql for Quality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.value()))
    }
}

impl FromSql for Quality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let n: u8 = FromSql::column_result(value)?;
        Quality::try_from(n).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_values() {
        assert_eq!(Quality::try_from(0), Ok(Quality::Again));
        assert_eq!(Quality::try_from(3), Ok(Quality::Hard));
        assert_eq!(Quality::try_from(4), Ok(Quality::Good));
        assert_eq!(Quality::try_from(5), Ok(Quality::Easy));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for n in [1, 2, 6, 255] {
            let err = Quality::try_from(n).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("error: invalid quality: {n} (expected 0, 3, 4, or 5)")
            );
        }
    }

    #[test]
    fn test_is_pass() {
        assert!(!Quality::Again.is_pass());
        assert!(Quality::Hard.is_pass());
        assert!(Quality::Easy.is_pass());
    }
}
