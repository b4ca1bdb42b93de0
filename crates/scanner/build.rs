use std::env;
use std::path::PathBuf;
use std::process::Command;

const KERNEL_SRC: &str = "kernels/cuda/bubble_fit_kernel.cu";
const KERNEL_PTX: &str = "bubble_fit_kernel.ptx";

fn main() {
    // PTX is only needed when the `cuda` feature pulls in the device code.
    if env::var("CARGO_FEATURE_CUDA").is_ok() {
        compile_kernel();
    }
}

fn compile_kernel() {
    println!("cargo:rerun-if-changed={}", KERNEL_SRC);
    println!("cargo:rerun-if-env-changed=NVCC");
    println!("cargo:rerun-if-env-changed=CUDA_ARCH");
    println!("cargo:rerun-if-env-changed=CUDA_PATH");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let ptx_path = out_dir.join(KERNEL_PTX);

    let nvcc = env::var("NVCC").unwrap_or_else(|_| format!("{}/bin/nvcc", find_cuda_path()));
    let arch = env::var("CUDA_ARCH")
        .ok()
        .filter(|a| !a.trim().is_empty())
        .map(|a| normalize_arch(&a))
        .unwrap_or_else(|| "compute_70".to_string());

    // Fast math is left off: the fit must agree with the host path.
    let status = Command::new(&nvcc)
        .args(["-std=c++17", "-ptx", "-O3", "-arch", &arch, "-o"])
        .arg(&ptx_path)
        .arg(KERNEL_SRC)
        .status()
        .unwrap_or_else(|e| panic!("failed to run {}: {}", nvcc, e));
    if !status.success() {
        panic!("nvcc failed to compile {}", KERNEL_SRC);
    }
}

fn find_cuda_path() -> String {
    env::var("CUDA_PATH")
        .or_else(|_| env::var("CUDA_HOME"))
        .unwrap_or_else(|_| "/usr/local/cuda".to_string())
}

// Accepts 70, 7.0, sm_70 or compute_70.
fn normalize_arch(arch: &str) -> String {
    let arch = arch.trim();
    if let Some(rest) = arch.strip_prefix("sm_") {
        return format!("compute_{}", rest);
    }
    if arch.starts_with("compute_") {
        return arch.to_string();
    }
    let digits: String = arch.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("compute_{}", digits)
}
