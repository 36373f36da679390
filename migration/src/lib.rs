pub use sea_orm_migration::prelude::*;

mod m0000010_create_blob;
mod m0000020_create_provider;
mod m0000030_create_vulnerability_handle;
mod m0000040_create_package;
mod m0000050_create_cpe;
mod m0000060_create_package_cpe;
mod m0000070_create_operating_system;
mod m0000080_create_affected_package_handle;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m0000010_create_blob::Migration),
            Box::new(m0000020_create_provider::Migration),
            Box::new(m0000030_create_vulnerability_handle::Migration),
            Box::new(m0000040_create_package::Migration),
            Box::new(m0000050_create_cpe::Migration),
            Box::new(m0000060_create_package_cpe::Migration),
            Box::new(m0000070_create_operating_system::Migration),
            Box::new(m0000080_create_affected_package_handle::Migration),
        ]
    }
}
