//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which outcome list a course outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "outcome_kind")]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Program outcome, owned by the academic board.
    #[sea_orm(string_value = "program")]
    Program,
    /// Learning outcome, owned by the course's teachers.
    #[sea_orm(string_value = "learning")]
    Learning,
}
