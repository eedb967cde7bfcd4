mod common;

use anyhow::Result;

use common::Harness;
use warden_api::roles::{Role, RoleChange};
use warden_api::services::users::UserAdminError;

// Role changes, provisioning, and the soft-delete path through the user
// administration service.

#[tokio::test]
async fn admin_promotes_employee_and_supervisor_link_is_cleared() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-admin", "admin@x.com", "Admin", Role::Admin);
    let sup = h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    let a = h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);
    h.directory.set_supervisor(a.id, Some(sup.id));

    let updated = h
        .users
        .change_role("ext-admin", "a@x.com", RoleChange::Set(Role::Supervisor))
        .await?;

    assert_eq!(updated.role, Role::Supervisor);
    // Only supervised PSOs may carry a supervisor reference.
    assert_eq!(updated.supervisor_id, None);

    let entries = h.audit.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "user.role_change");
    assert_eq!(entries[0].before["role"], "EMPLOYEE");
    assert_eq!(entries[0].after["role"], "SUPERVISOR");

    Ok(())
}

#[tokio::test]
async fn null_role_soft_deletes_the_user() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    let a = h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);

    let updated = h
        .users
        .change_role("ext-sup", "a@x.com", RoleChange::from_wire(None))
        .await?;

    assert_eq!(updated.role, Role::Unassigned);
    assert!(updated.deleted_at.is_some());

    // The record stays, but it no longer resolves as active.
    let stored = h.directory.get(a.id);
    assert!(stored.deleted_at.is_some());
    assert!(h.authorization.resolve_caller("ext-a").await.is_err());

    let entries = h.audit.entries.lock().unwrap();
    assert_eq!(entries[0].action, "user.soft_delete");

    Ok(())
}

#[tokio::test]
async fn demoting_a_supervisor_releases_their_reports() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-admin", "admin@x.com", "Admin", Role::Admin);
    let sup = h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    let a = h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);
    let b = h.directory.seed("ext-b", "b@x.com", "B", Role::Employee);
    h.directory.set_supervisor(a.id, Some(sup.id));
    h.directory.set_supervisor(b.id, Some(sup.id));

    h.users
        .change_role("ext-admin", "sup@x.com", RoleChange::Set(Role::Employee))
        .await?;

    // A supervisor reference is only valid while its user holds the role.
    assert_eq!(h.directory.get(a.id).supervisor_id, None);
    assert_eq!(h.directory.get(b.id).supervisor_id, None);

    Ok(())
}

#[tokio::test]
async fn soft_deleting_a_supervisor_releases_their_reports() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-admin", "admin@x.com", "Admin", Role::Admin);
    let sup = h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    let a = h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);
    h.directory.set_supervisor(a.id, Some(sup.id));

    h.users
        .change_role("ext-admin", "sup@x.com", RoleChange::Unassign)
        .await?;

    assert!(h.directory.get(sup.id).deleted_at.is_some());
    assert_eq!(h.directory.get(a.id).supervisor_id, None);

    Ok(())
}

#[tokio::test]
async fn supervisor_cannot_grant_admin() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);

    let err = h
        .users
        .change_role("ext-sup", "a@x.com", RoleChange::Set(Role::Admin))
        .await
        .unwrap_err();

    assert!(matches!(err, UserAdminError::Auth(_)));
    assert_eq!(h.directory.get_by_email("a@x.com").role, Role::Employee);

    Ok(())
}

#[tokio::test]
async fn provisioning_normalizes_email_and_audits() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-admin", "admin@x.com", "Admin", Role::Admin);

    let user = h
        .users
        .create_user(
            "ext-admin",
            "ext-new".to_string(),
            "  New.PSO@Example.COM ",
            "New PSO".to_string(),
            Role::Employee,
        )
        .await?;

    assert_eq!(user.email, "new.pso@example.com");
    assert_eq!(user.role, Role::Employee);

    let entries = h.audit.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "user.create");
    assert_eq!(entries[0].after["email"], "new.pso@example.com");

    Ok(())
}

#[tokio::test]
async fn provisioning_rejects_duplicates_and_bad_emails() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-admin", "admin@x.com", "Admin", Role::Admin);
    h.directory.seed("ext-a", "a@x.com", "A", Role::Employee);

    let err = h
        .users
        .create_user(
            "ext-admin",
            "ext-dup".to_string(),
            "a@x.com",
            "Duplicate".to_string(),
            Role::Employee,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserAdminError::Directory(_)));

    let err = h
        .users
        .create_user(
            "ext-admin",
            "ext-bad".to_string(),
            "not-an-email",
            "Bad".to_string(),
            Role::Employee,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserAdminError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn listing_requires_the_manage_users_capability() -> Result<()> {
    let h = Harness::new();
    h.directory.seed("ext-sup", "sup@x.com", "Supervisor", Role::Supervisor);
    h.directory.seed("ext-pso", "pso@x.com", "PSO", Role::Employee);
    h.directory.seed_deleted("ext-gone", "gone@x.com", "Gone");

    let listed = h.users.list_users("ext-sup").await?;
    // Soft-deleted users are not listed.
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|u| u.deleted_at.is_none()));

    let err = h.users.list_users("ext-pso").await.unwrap_err();
    assert!(matches!(err, UserAdminError::Auth(_)));

    Ok(())
}
