//! GraphQL request synthesis for discovered object types

pub mod builder;

pub use builder::{
    build_create, build_delete, build_find_by, build_get, build_list, build_update, GraphqlRequest,
};
