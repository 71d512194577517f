use pathpoints::Server;

fn main() -> std::io::Result<()> {
    Server::default()
        .load_environment_variables()
        .set_config_from_env()
        .init_tracing()
        .enable_migrations()
        .run()
}
