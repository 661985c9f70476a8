pub type Square = usize;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}

/// Moves a square by a (file, rank) step, returning None when it leaves the board
/// ```
/// use voice_chess::square::step;
/// assert_eq!(step(4, 0, 1), Some(12));
/// assert_eq!(step(7, 1, 0), None);
/// ```
pub fn step(sq: Square, file_delta: isize, rank_delta: isize) -> Option<Square> {
    let file = file_of(sq) as isize + file_delta;
    let rank = rank_of(sq) as isize + rank_delta;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use voice_chess::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2someotherstuff"), Some(11));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    Some(rank * 8 + file)
}

pub fn parse_file(c: char) -> Option<usize> {
    ('a'..='h').position(|f| f == c)
}

pub fn parse_rank(c: char) -> Option<usize> {
    ('1'..='8').position(|r| r == c)
}

pub fn file_char(sq: Square) -> char {
    (b'a' + file_of(sq) as u8) as char
}

pub fn rank_char(sq: Square) -> char {
    (b'1' + rank_of(sq) as u8) as char
}

/// Returns the string representation of a square
/// ```
/// use voice_chess::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    Some([file_char(sq), rank_char(sq)].iter().collect())
}

/// Checks whether a given square is in bounds (0..64) or not
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}

/// Whether the square is a light one (h1 is light)
pub fn is_light(sq: Square) -> bool {
    (file_of(sq) + rank_of(sq)) % 2 == 1
}
