fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the vendored protoc binary so the build does not depend on a
    // system-installed `protoc` (none is available in some environments).
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }
    tonic_build::compile_protos("proto/stash.proto")?;
    Ok(())
}
