use std::collections::HashSet;

use crate::context::TenantId;
use crate::task::User;

/// Yield one `(user, tenant_id)` pair per distinct tenant.
///
/// The first user seen for a tenant is the one returned and tenants come out in the order they
/// first appear in `users`.
pub fn iterate_per_tenants(users: &[User]) -> impl Iterator<Item = (&User, &TenantId)> {
    let mut seen = HashSet::new();
    users
        .iter()
        .filter(move |user| seen.insert(user.tenant_id.as_str()))
        .map(|user| (user, &user.tenant_id))
}
