fn main() -> std::process::ExitCode {
    server_setup_lib::run()
}
