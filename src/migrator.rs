use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_master_tables::Migration),
            Box::new(m20240601_000002_create_orders_table::Migration),
            Box::new(m20240601_000003_create_fleet_reservations_table::Migration),
            Box::new(m20240601_000004_create_finance_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_master_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_master_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string())
                        .col(ColumnDef::new(Customers::CreditLimit).decimal().not_null())
                        .col(ColumnDef::new(Customers::CurrentBalance).decimal().not_null())
                        .col(ColumnDef::new(Customers::PriceTier).string())
                        .col(
                            ColumnDef::new(Customers::Blocked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Depots::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Depots::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Depots::Name).string().not_null())
                        .col(ColumnDef::new(Depots::Location).string())
                        .col(ColumnDef::new(Depots::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Depots::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DepotStock::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(DepotStock::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(DepotStock::DepotId).uuid().not_null())
                        .col(ColumnDef::new(DepotStock::CementType).string().not_null())
                        .col(ColumnDef::new(DepotStock::Quantity).decimal().not_null())
                        .col(ColumnDef::new(DepotStock::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_depot_stock_depot_cement")
                        .table(DepotStock::Table)
                        .col(DepotStock::DepotId)
                        .col(DepotStock::CementType)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Contact).string())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Drivers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Drivers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Drivers::Name).string().not_null())
                        .col(ColumnDef::new(Drivers::Phone).string())
                        .col(ColumnDef::new(Drivers::LicenseNumber).string())
                        .col(
                            ColumnDef::new(Drivers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Drivers::TripAllowance).decimal().not_null())
                        .col(ColumnDef::new(Drivers::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Drivers::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Trucks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Trucks::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Trucks::PlateNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Trucks::Capacity).decimal().not_null())
                        .col(ColumnDef::new(Trucks::Unit).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Trucks::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Trucks::DriverId).uuid())
                        .col(ColumnDef::new(Trucks::DefaultFuelCost).decimal().not_null())
                        .col(ColumnDef::new(Trucks::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Trucks::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ComplianceDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ComplianceDocuments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ComplianceDocuments::EntityType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ComplianceDocuments::EntityId).uuid().not_null())
                        .col(ColumnDef::new(ComplianceDocuments::DocType).string().not_null())
                        .col(
                            ColumnDef::new(ComplianceDocuments::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ComplianceDocuments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_compliance_documents_entity")
                        .table(ComplianceDocuments::Table)
                        .col(ComplianceDocuments::EntityType)
                        .col(ComplianceDocuments::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ComplianceDocuments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Trucks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Drivers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DepotStock::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Depots::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Phone,
        CreditLimit,
        CurrentBalance,
        PriceTier,
        Blocked,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Depots {
        Table,
        Id,
        Name,
        Location,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DepotStock {
        Table,
        Id,
        DepotId,
        CementType,
        Quantity,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Contact,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Drivers {
        Table,
        Id,
        Name,
        Phone,
        LicenseNumber,
        Active,
        TripAllowance,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Trucks {
        Table,
        Id,
        PlateNumber,
        Capacity,
        Unit,
        Active,
        DriverId,
        DefaultFuelCost,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ComplianceDocuments {
        Table,
        Id,
        EntityType,
        EntityId,
        DocType,
        ExpiresAt,
        CreatedAt,
    }
}

mod m20240601_000002_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderType).string_len(32).not_null())
                        .col(ColumnDef::new(Orders::CementType).string().not_null())
                        .col(ColumnDef::new(Orders::Quantity).decimal().not_null())
                        .col(ColumnDef::new(Orders::Unit).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::DepotId).uuid().not_null())
                        .col(ColumnDef::new(Orders::SupplierId).uuid())
                        .col(ColumnDef::new(Orders::TruckId).uuid())
                        .col(ColumnDef::new(Orders::DriverId).uuid())
                        .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Orders::PurchasePrice).decimal().not_null())
                        .col(ColumnDef::new(Orders::SalePrice).decimal().not_null())
                        .col(ColumnDef::new(Orders::TotalPurchase).decimal().not_null())
                        .col(ColumnDef::new(Orders::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(Orders::CementProfit).decimal().not_null())
                        .col(ColumnDef::new(Orders::MarginPercent).decimal().not_null())
                        .col(ColumnDef::new(Orders::FuelCost).decimal().not_null())
                        .col(ColumnDef::new(Orders::DriverAllowance).decimal().not_null())
                        .col(ColumnDef::new(Orders::OtherTripCosts).decimal().not_null())
                        .col(ColumnDef::new(Orders::TotalTripCost).decimal().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::PaymentTerms).string())
                        .col(ColumnDef::new(Orders::DeliveryOtp).string_len(6))
                        .col(ColumnDef::new(Orders::DeliveryAddress).string())
                        .col(ColumnDef::new(Orders::WaybillNumber).string())
                        .col(ColumnDef::new(Orders::GatePassNumber).string())
                        .col(ColumnDef::new(Orders::LoadingManifestNumber).string())
                        .col(ColumnDef::new(Orders::AtcNumber).string())
                        .col(ColumnDef::new(Orders::CapNumber).string())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        OrderType,
        CementType,
        Quantity,
        Unit,
        CustomerId,
        DepotId,
        SupplierId,
        TruckId,
        DriverId,
        Status,
        PurchasePrice,
        SalePrice,
        TotalPurchase,
        TotalAmount,
        CementProfit,
        MarginPercent,
        FuelCost,
        DriverAllowance,
        OtherTripCosts,
        TotalTripCost,
        PaymentStatus,
        PaymentTerms,
        DeliveryOtp,
        DeliveryAddress,
        WaybillNumber,
        GatePassNumber,
        LoadingManifestNumber,
        AtcNumber,
        CapNumber,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240601_000003_create_fleet_reservations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_fleet_reservations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FleetReservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FleetReservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FleetReservations::TruckId).uuid().not_null())
                        .col(ColumnDef::new(FleetReservations::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(FleetReservations::AcquiredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FleetReservations::ReleasedAt)
                                .timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_fleet_reservations_order_id")
                        .table(FleetReservations::Table)
                        .col(FleetReservations::OrderId)
                        .to_owned(),
                )
                .await?;

            // Partial unique index: at most one open reservation per truck.
            // sea-query's index builder cannot express the WHERE clause, so
            // this goes through raw SQL (valid on both Postgres and SQLite).
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_fleet_reservations_open_truck \
                     ON fleet_reservations (truck_id) WHERE released_at IS NULL",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FleetReservations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FleetReservations {
        Table,
        Id,
        TruckId,
        OrderId,
        AcquiredAt,
        ReleasedAt,
    }
}

mod m20240601_000004_create_finance_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_finance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shortages::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Shortages::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Shortages::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Shortages::DispatchedQty).decimal().not_null())
                        .col(ColumnDef::new(Shortages::GoodQty).decimal().not_null())
                        .col(ColumnDef::new(Shortages::MissingQty).decimal().not_null())
                        .col(ColumnDef::new(Shortages::DamagedQty).decimal().not_null())
                        .col(ColumnDef::new(Shortages::Liability).string_len(16).not_null())
                        .col(ColumnDef::new(Shortages::DeductionAmount).decimal().not_null())
                        .col(ColumnDef::new(Shortages::Reason).string())
                        .col(ColumnDef::new(Shortages::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Shortages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DriverTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DriverTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DriverTransactions::DriverId).uuid().not_null())
                        .col(ColumnDef::new(DriverTransactions::OrderId).uuid())
                        .col(
                            ColumnDef::new(DriverTransactions::TransactionType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(DriverTransactions::Amount).decimal().not_null())
                        .col(ColumnDef::new(DriverTransactions::Note).string())
                        .col(
                            ColumnDef::new(DriverTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_driver_transactions_driver_id")
                        .table(DriverTransactions::Table)
                        .col(DriverTransactions::DriverId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Payments::OrderId).uuid())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(ColumnDef::new(Payments::Method).string_len(16).not_null())
                        .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Payments::Reference).string())
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_customer_id")
                        .table(Payments::Table)
                        .col(Payments::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Expenses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Expenses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Expenses::OrderId).uuid())
                        .col(ColumnDef::new(Expenses::Category).string().not_null())
                        .col(ColumnDef::new(Expenses::Amount).decimal().not_null())
                        .col(ColumnDef::new(Expenses::Note).string())
                        .col(
                            ColumnDef::new(Expenses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CreditNotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CreditNotes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(CreditNotes::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(CreditNotes::OrderId).uuid().not_null())
                        .col(ColumnDef::new(CreditNotes::Amount).decimal().not_null())
                        .col(ColumnDef::new(CreditNotes::Reason).string().not_null())
                        .col(
                            ColumnDef::new(CreditNotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Purchases::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Purchases::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Purchases::OrderId).uuid())
                        .col(ColumnDef::new(Purchases::CementType).string().not_null())
                        .col(ColumnDef::new(Purchases::Quantity).decimal().not_null())
                        .col(ColumnDef::new(Purchases::UnitCost).decimal().not_null())
                        .col(ColumnDef::new(Purchases::TotalCost).decimal().not_null())
                        .col(
                            ColumnDef::new(Purchases::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CreditNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Expenses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DriverTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shortages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shortages {
        Table,
        Id,
        OrderId,
        DispatchedQty,
        GoodQty,
        MissingQty,
        DamagedQty,
        Liability,
        DeductionAmount,
        Reason,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DriverTransactions {
        Table,
        Id,
        DriverId,
        OrderId,
        TransactionType,
        Amount,
        Note,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        CustomerId,
        OrderId,
        Amount,
        Method,
        Status,
        Reference,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Expenses {
        Table,
        Id,
        OrderId,
        Category,
        Amount,
        Note,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CreditNotes {
        Table,
        Id,
        CustomerId,
        OrderId,
        Amount,
        Reason,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Purchases {
        Table,
        Id,
        SupplierId,
        OrderId,
        CementType,
        Quantity,
        UnitCost,
        TotalCost,
        CreatedAt,
    }
}
