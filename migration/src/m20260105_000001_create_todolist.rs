// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Todolist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Todolist::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Todolist::ProcInstId).string().not_null())
                    .col(ColumnDef::new(Todolist::ActivityName).string().not_null())
                    .col(
                        ColumnDef::new(Todolist::StartDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Todolist::Status)
                            .string()
                            .not_null()
                            .default("IN_PROGRESS"),
                    )
                    .col(ColumnDef::new(Todolist::DraftStatus).string().null())
                    .col(ColumnDef::new(Todolist::Consumer).string().null())
                    .col(ColumnDef::new(Todolist::AgentMode).string().not_null())
                    .col(ColumnDef::new(Todolist::AgentOrch).string().not_null())
                    .col(ColumnDef::new(Todolist::Output).json().null())
                    .col(
                        ColumnDef::new(Todolist::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Claim: status + draft_status filter, start_date ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_todolist_claim")
                    .table(Todolist::Table)
                    .col(Todolist::Status)
                    .col(Todolist::DraftStatus)
                    .col(Todolist::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_todolist_proc_inst_start_date")
                    .table(Todolist::Table)
                    .col(Todolist::ProcInstId)
                    .col(Todolist::StartDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Todolist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Todolist {
    Table,
    Id,
    ProcInstId,
    ActivityName,
    StartDate,
    Status,
    DraftStatus,
    Consumer,
    AgentMode,
    AgentOrch,
    Output,
    ClaimedAt,
}
