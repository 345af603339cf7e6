use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Payments::TransactionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Payments::PaymentMethod)
                            .string()
                            .not_null()
                            .default("online_payment"),
                    )
                    .col(ColumnDef::new(Payments::IsPaid).boolean().not_null().default(false))
                    .col(ColumnDef::new(Payments::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(Payments::TransactionError).text())
                    .col(ColumnDef::new(Payments::Currency).string().not_null().default("USD"))
                    .col(ColumnDef::new(Payments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Payments::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_user")
                    .table(Payments::Table)
                    .col(Payments::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentItems::PaymentId).big_integer().not_null())
                    .col(ColumnDef::new(PaymentItems::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(PaymentItems::Quantity).integer().not_null().default(1))
                    .col(ColumnDef::new(PaymentItems::TotalPrice).double().not_null())
                    .col(ColumnDef::new(PaymentItems::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PaymentItems::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_items_payment")
                    .table(PaymentItems::Table)
                    .col(PaymentItems::PaymentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(Index::drop().name("idx_payments_user").to_owned())
            .await;
        let _ = manager
            .drop_index(Index::drop().name("idx_payment_items_payment").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(PaymentItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    TransactionId,
    UserId,
    OrderId,
    Amount,
    PaymentMethod,
    IsPaid,
    Status,
    TransactionError,
    Currency,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentItems {
    Table,
    Id,
    PaymentId,
    ProductId,
    Quantity,
    TotalPrice,
    CreatedAt,
    UpdatedAt,
}
