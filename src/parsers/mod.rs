pub mod langpack;
