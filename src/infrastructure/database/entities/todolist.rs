// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "todolist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub proc_inst_id: String,
    pub activity_name: String,
    pub start_date: ChronoDateTimeWithTimeZone,
    pub status: String,
    pub draft_status: Option<String>,
    pub consumer: Option<String>,
    pub agent_mode: String,
    pub agent_orch: String,
    pub output: Option<Json>,
    pub claimed_at: Option<ChronoDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
