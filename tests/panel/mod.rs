//! Panel integration tests: selection flow, search properties and
//! background enumeration.

mod background;
mod properties;
mod scenarios;
