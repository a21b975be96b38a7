mod browse;
mod detail;
mod helpers;
mod import;

pub(crate) use browse::{cmd_groups, cmd_list, cmd_search, cmd_show};
pub(crate) use detail::{cmd_nutrients, cmd_weights};
pub(crate) use import::cmd_import;
