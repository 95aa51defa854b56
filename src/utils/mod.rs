pub mod string_util;
