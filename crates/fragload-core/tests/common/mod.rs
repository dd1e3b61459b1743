pub mod fragment_server;
