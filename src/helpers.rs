pub mod converters;
