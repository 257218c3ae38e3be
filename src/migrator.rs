// `MigrationTrait` requires the elided `&SchemaManager` signature; an explicit
// `<'_>` lifetime fails E0195 under async_trait, so the idiom lint is allowed here.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_mechanics_table::Migration),
            Box::new(m20260101_000002_create_service_catalog_entries_table::Migration),
            Box::new(m20260101_000003_create_parts_table::Migration),
            Box::new(m20260101_000004_create_service_jobs_table::Migration),
            Box::new(m20260101_000005_create_part_usage_lines_table::Migration),
            Box::new(m20260101_000006_create_payment_records_table::Migration),
        ]
    }
}

// Migration implementations

mod m20260101_000001_create_mechanics_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_mechanics_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Mechanics::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Mechanics::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Mechanics::Name).string().not_null())
                        .col(ColumnDef::new(Mechanics::HourlyRate).decimal().null())
                        .col(ColumnDef::new(Mechanics::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Mechanics::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Mechanics {
        Table,
        Id,
        Name,
        HourlyRate,
        CreatedAt,
    }
}

mod m20260101_000002_create_service_catalog_entries_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_service_catalog_entries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceCatalogEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceCatalogEntries::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceCatalogEntries::Name)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceCatalogEntries::EstimatedDurationMinutes)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceCatalogEntries::BasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceCatalogEntries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceCatalogEntries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceCatalogEntries {
        Table,
        Id,
        Name,
        EstimatedDurationMinutes,
        BasePrice,
        CreatedAt,
    }
}

mod m20260101_000003_create_parts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parts::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Parts::Name).string().not_null())
                        .col(
                            ColumnDef::new(Parts::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Parts::Category).string().null())
                        .col(
                            ColumnDef::new(Parts::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::UnitCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Parts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_code")
                        .table(Parts::Table)
                        .col(Parts::Code)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Parts {
        Table,
        Id,
        Name,
        Code,
        Category,
        Quantity,
        MinQuantity,
        UnitCost,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000004_create_service_jobs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_service_jobs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceJobs::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceJobs::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(ServiceJobs::VehicleId).big_integer().not_null())
                        .col(
                            ColumnDef::new(ServiceJobs::CatalogEntryId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceJobs::MechanicId).big_integer().null())
                        .col(
                            ColumnDef::new(ServiceJobs::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceJobs::EstimatedCost).decimal().null())
                        .col(ColumnDef::new(ServiceJobs::FinalCost).decimal().null())
                        .col(
                            ColumnDef::new(ServiceJobs::ScheduledAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceJobs::CompletedAt).timestamp().null())
                        .col(ColumnDef::new(ServiceJobs::CustomerNotes).string().null())
                        .col(ColumnDef::new(ServiceJobs::MechanicNotes).string().null())
                        .col(
                            ColumnDef::new(ServiceJobs::IsPaid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ServiceJobs::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(ServiceJobs::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_jobs_status")
                        .table(ServiceJobs::Table)
                        .col(ServiceJobs::Status)
                        .to_owned(),
                )
                .await?;

            // Compensation queries filter on (mechanic, status, is_paid)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_jobs_mechanic_status_paid")
                        .table(ServiceJobs::Table)
                        .col(ServiceJobs::MechanicId)
                        .col(ServiceJobs::Status)
                        .col(ServiceJobs::IsPaid)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceJobs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceJobs {
        Table,
        Id,
        CustomerId,
        VehicleId,
        CatalogEntryId,
        MechanicId,
        Status,
        EstimatedCost,
        FinalCost,
        ScheduledAt,
        CompletedAt,
        CustomerNotes,
        MechanicNotes,
        IsPaid,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000005_create_part_usage_lines_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000005_create_part_usage_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PartUsageLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PartUsageLines::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartUsageLines::JobId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartUsageLines::PartId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PartUsageLines::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(PartUsageLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartUsageLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_part_usage_lines_job_id")
                        .table(PartUsageLines::Table)
                        .col(PartUsageLines::JobId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PartUsageLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PartUsageLines {
        Table,
        Id,
        JobId,
        PartId,
        Quantity,
        UnitPrice,
        CreatedAt,
    }
}

mod m20260101_000006_create_payment_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000006_create_payment_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentRecords::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentRecords::MechanicId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentRecords::TimeBasedPay)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentRecords::Bonus).decimal().not_null())
                        .col(
                            ColumnDef::new(PaymentRecords::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentRecords::JobsIncluded)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentRecords::PaidBy).big_integer().not_null())
                        .col(ColumnDef::new(PaymentRecords::Note).string().null())
                        .col(ColumnDef::new(PaymentRecords::PaidAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payment_records_mechanic_id")
                        .table(PaymentRecords::Table)
                        .col(PaymentRecords::MechanicId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PaymentRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PaymentRecords {
        Table,
        Id,
        MechanicId,
        TimeBasedPay,
        Bonus,
        TotalAmount,
        JobsIncluded,
        PaidBy,
        Note,
        PaidAt,
    }
}
