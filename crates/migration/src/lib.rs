pub use sea_orm_migration::prelude::*;

mod m20260801_000001_users_and_verification_codes;
mod m20260801_000002_catalog_tables;
mod m20260802_000003_carts_and_favourites;
mod m20260802_000004_orders_tables;
mod m20260802_000005_payments_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_users_and_verification_codes::Migration),
            Box::new(m20260801_000002_catalog_tables::Migration),
            Box::new(m20260802_000003_carts_and_favourites::Migration),
            Box::new(m20260802_000004_orders_tables::Migration),
            Box::new(m20260802_000005_payments_tables::Migration),
        ]
    }
}
