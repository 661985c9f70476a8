use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use rand_mt::Mt64;

// Lookup tables are generated once at build time so the board code has no
// init functions and hashing stays reproducible across runs.
fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let lookup_file = Path::new(&out_dir).join("lookup.rs");
    let zobrist_file = Path::new(&out_dir).join("zobrist_keys.rs");

    let mut file = File::create(lookup_file).unwrap();
    inject_array(
        &mut file,
        "pub const KNIGHT_TARGETS: [u64; 64]",
        &step_targets(&[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)]),
    );
    inject_array(
        &mut file,
        "pub const KING_TARGETS: [u64; 64]",
        &step_targets(&[(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)]),
    );

    file = File::create(zobrist_file).unwrap();
    writeln!(&mut file, "impl ZobristHasher {{").unwrap();
    inject_array(
        &mut file,
        "pub const ZOBRIST_KEYS: [u64; 781]",
        &zobrist_keys(),
    );
    writeln!(&mut file, "}}").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}

fn inject_array<T: ToString>(file: &mut File, declaration: &str, array: &[T]) {
    writeln!(file, "{} = [", declaration).unwrap();
    for value in array {
        write!(file, "{}, ", value.to_string()).unwrap();
    }
    writeln!(file, "];").unwrap();
}

/// For every square, the set of squares reachable with one of the given
/// (file, rank) steps, as a 64 bit mask
fn step_targets(steps: &[(i32, i32)]) -> Vec<u64> {
    (0..64)
        .map(|sq: i32| {
            let (file, rank) = (sq % 8, sq / 8);
            steps.iter().fold(0u64, |mask, (df, dr)| {
                let (f, r) = (file + df, rank + dr);
                if (0..8).contains(&f) && (0..8).contains(&r) {
                    mask | 1u64 << (r * 8 + f)
                } else {
                    mask
                }
            })
        })
        .collect()
}

/// 12*64 piece-square keys, side to move, 4 castling keys, 8 en passant files
fn zobrist_keys() -> [u64; 781] {
    let mut rng = Mt64::new_unseeded();
    [0u64; 781].map(|_| rng.next_u64())
}
