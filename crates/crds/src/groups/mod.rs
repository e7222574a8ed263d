//! Group-scoped kinds (`groups.gitlab.crossplane.io`)

pub mod group;
pub mod group_member;
pub mod ldap_group_link;
pub mod saml_group_link;

pub use group::*;
pub use group_member::*;
pub use ldap_group_link::*;
pub use saml_group_link::*;
