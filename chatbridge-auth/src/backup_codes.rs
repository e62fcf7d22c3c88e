use rand::Rng;

pub const BACKUP_CODE_COUNT: usize = 8;
pub const BACKUP_CODE_LEN: usize = 6;

const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn generate_backup_codes() -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..BACKUP_CODE_COUNT)
        .map(|_| {
            (0..BACKUP_CODE_LEN)
                .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
                .collect()
        })
        .collect()
}

/// Codes are stored upper-case; users may type them in any case.
pub fn normalize_backup_code(code: &str) -> String {
    code.trim().to_uppercase()
}
