use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Carts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Carts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Carts::SessionKey).string())
                    .col(ColumnDef::new(Carts::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(Carts::Quantity).integer().not_null().default(1))
                    .col(ColumnDef::new(Carts::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carts_user")
                    .table(Carts::Table)
                    .col(Carts::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favourites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favourites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favourites::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Favourites::SessionKey).string())
                    .col(ColumnDef::new(Favourites::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(Favourites::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favourites_user")
                    .table(Favourites::Table)
                    .col(Favourites::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(Index::drop().name("idx_carts_user").to_owned())
            .await;
        let _ = manager
            .drop_index(Index::drop().name("idx_favourites_user").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(Favourites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    UserId,
    SessionKey,
    ProductId,
    Quantity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Favourites {
    Table,
    Id,
    UserId,
    SessionKey,
    ProductId,
    CreatedAt,
}
