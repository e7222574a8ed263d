//! Group-scoped adapters
//!
//! Handles: Group, GroupMember, SamlGroupLink, LdapGroupLink

pub mod group;
pub mod group_member;
pub mod ldap_group_link;
#[cfg(test)]
mod ldap_group_link_test;
pub mod saml_group_link;
#[cfg(test)]
mod saml_group_link_test;
