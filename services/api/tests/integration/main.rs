mod helpers;

mod access_test;
mod session_test;
