// Roda contra um Postgres real: `DATABASE_URL=... cargo test -- --ignored`
// O #[sqlx::test] cria um banco descartável e aplica `migrations/`.

use sqlx::PgPool;

use company_service::{
    common::{error::AppError, patch::Patch},
    db::{BranchRepository, PgBranchRepository, PgWarehouseRepository, WarehouseRepository},
    middleware::{auth::CurrentUser, tenancy::TenantContext},
    models::{
        branch::{BranchChanges, NewBranch},
        warehouse::{NewWarehouse, WarehouseChanges},
    },
};

fn tenant(company_id: i32) -> TenantContext {
    TenantContext::from(&CurrentUser { user_id: 1, company_id })
}

fn new_branch(name: &str) -> NewBranch {
    NewBranch {
        name: name.into(),
        address: "Av. Principal 100".into(),
        phone: Some("5551234".into()),
        active: true,
    }
}

fn new_warehouse(name: &str) -> NewWarehouse {
    NewWarehouse {
        name: name.into(),
        description: Some("Fria".into()),
        is_primary: false,
        active: true,
    }
}

async fn warehouse_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM almacenes")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore]
async fn patch_keeps_missing_fields_and_clears_null_ones(pool: PgPool) {
    let repo = PgBranchRepository::new(pool);
    let company = tenant(10);
    let branch = repo.create(&company, &new_branch("Centro")).await.unwrap();

    let changes = BranchChanges {
        phone: Patch::<String>::Null.into_nullable(),
        ..Default::default()
    };
    let updated = repo.update(&company, branch.id, &changes).await.unwrap().unwrap();
    assert_eq!(updated.phone, None);
    assert_eq!(updated.name, "Centro");
    assert_eq!(updated.address, "Av. Principal 100");

    let changes = BranchChanges { name: Some("Norte".into()), ..Default::default() };
    let updated = repo.update(&company, branch.id, &changes).await.unwrap().unwrap();
    assert_eq!(updated.name, "Norte");
    assert_eq!(updated.phone, None);

    assert!(repo.update(&tenant(20), branch.id, &changes).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn create_linked_rolls_back_for_a_foreign_branch(pool: PgPool) {
    let branches = PgBranchRepository::new(pool.clone());
    let warehouses = PgWarehouseRepository::new(pool.clone());
    let foreign = branches.create(&tenant(10), &new_branch("Centro")).await.unwrap();

    let err = warehouses
        .create_linked(&tenant(20), &new_warehouse("Bodega"), foreign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BranchNotOwned));
    assert_eq!(warehouse_rows(&pool).await, 0);

    let warehouse = warehouses
        .create_linked(&tenant(10), &new_warehouse("Bodega"), foreign.id)
        .await
        .unwrap();
    let listed = branches.list_warehouses(&tenant(10), foreign.id).await.unwrap();
    assert_eq!(listed, vec![warehouse]);
}

#[sqlx::test]
#[ignore]
async fn duplicate_links_and_assignments_are_conflicts(pool: PgPool) {
    let branches = PgBranchRepository::new(pool.clone());
    let warehouses = PgWarehouseRepository::new(pool);
    let company = tenant(10);
    let branch = branches.create(&company, &new_branch("Centro")).await.unwrap();
    let other = branches.create(&company, &new_branch("Norte")).await.unwrap();
    let warehouse = warehouses
        .create_linked(&company, &new_warehouse("Bodega"), branch.id)
        .await
        .unwrap();

    warehouses.link_branch(&company, warehouse.id, other.id).await.unwrap();
    let err = warehouses
        .link_branch(&company, warehouse.id, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LinkAlreadyExists));

    branches.assign_user(&company, branch.id, 5).await.unwrap();
    let err = branches.assign_user(&company, branch.id, 5).await.unwrap_err();
    assert!(matches!(err, AppError::AssignmentAlreadyExists));

    assert!(warehouses.unlink_branch(&company, warehouse.id, other.id).await.unwrap());
    assert!(!warehouses.unlink_branch(&company, warehouse.id, other.id).await.unwrap());
}

#[sqlx::test]
#[ignore]
async fn soft_delete_keeps_the_row_visible(pool: PgPool) {
    let branches = PgBranchRepository::new(pool.clone());
    let warehouses = PgWarehouseRepository::new(pool);
    let company = tenant(10);
    let branch = branches.create(&company, &new_branch("Centro")).await.unwrap();
    let warehouse = warehouses
        .create_linked(&company, &new_warehouse("Bodega"), branch.id)
        .await
        .unwrap();

    assert!(warehouses.deactivate(&company, warehouse.id).await.unwrap());
    assert!(warehouses.deactivate(&company, warehouse.id).await.unwrap());
    assert!(!warehouses.deactivate(&tenant(20), warehouse.id).await.unwrap());

    let found = warehouses.find(&company, warehouse.id).await.unwrap().unwrap();
    assert!(!found.active);

    let changes = WarehouseChanges { is_primary: Some(true), ..Default::default() };
    let updated = warehouses.update(&company, warehouse.id, &changes).await.unwrap().unwrap();
    assert!(updated.is_primary);
    assert_eq!(updated.description.as_deref(), Some("Fria"));
}
