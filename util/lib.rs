/*!
This crate contains small helpers shared by the other crates in the lookout workspace.
*/

mod table;

pub use self::table::Table;
