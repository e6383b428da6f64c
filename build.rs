fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/datasource.proto");

    // Use the vendored protoc binary so the build does not depend on a
    // system-installed protobuf compiler.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile(&["proto/datasource.proto"], &["proto"])?;

    Ok(())
}
