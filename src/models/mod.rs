pub mod gravity_column;
