//! Курсор для посимвольного чтения текста.
//!
//! Все длины считаются в символах, а не в байтах: выписки польских и
//! немецких банков содержат не-ASCII буквы.

/// Курсор поверх заимствованной строки.
#[derive(Debug, Clone)]
pub struct TextReader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TextReader<'a> {
    /// Создает курсор, указывающий на начало текста.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Остаток текста, еще не прочитанный курсором.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// true, если текст прочитан полностью.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Байтовая длина первых `n` символов остатка (или всего остатка).
    fn span(&self, n: usize) -> usize {
        let rest = self.remaining();
        rest.char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len())
    }

    /// Читает не более `n` символов. У конца текста результат короче.
    pub fn read(&mut self, n: usize) -> &'a str {
        let len = self.span(n);
        let value = &self.text[self.pos..self.pos + len];
        self.pos += len;
        value
    }

    /// Возвращает до `n` символов, не сдвигая курсор.
    pub fn peek(&self, n: usize) -> &'a str {
        &self.remaining()[..self.span(n)]
    }

    /// Пропускает до `n` символов.
    pub fn skip(&mut self, n: usize) {
        self.pos += self.span(n);
    }

    /// Читает символы, пока выполняется предикат, но не более `max`.
    pub fn read_while<P>(&mut self, mut pred: P, max: usize) -> &'a str
    where
        P: FnMut(char) -> bool,
    {
        let rest = self.remaining();
        let len = rest
            .char_indices()
            .take(max)
            .find(|&(_, c)| !pred(c))
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| self.span(max));
        self.pos += len;
        &rest[..len]
    }

    /// Читает весь остаток текста.
    pub fn read_to_end(&mut self) -> &'a str {
        let rest = self.remaining();
        self.pos = self.text.len();
        rest
    }

    /// Читает текст до ближайшего вхождения любого из маркеров.
    ///
    /// Найденный маркер поглощается, в ответе возвращается его индекс.
    /// Если маркеров нет, возвращается весь остаток и `None`. При
    /// совпадении позиций побеждает маркер, указанный раньше.
    pub fn read_to<I>(&mut self, markers: I) -> (&'a str, Option<usize>)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let rest = self.remaining();
        let nearest = markers
            .into_iter()
            .enumerate()
            .filter_map(|(idx, marker)| {
                let marker = marker.as_ref();
                if marker.is_empty() {
                    return None;
                }
                rest.find(marker).map(|pos| (pos, idx, marker.len()))
            })
            .min();

        match nearest {
            Some((pos, idx, len)) => {
                self.pos += pos + len;
                (&rest[..pos], Some(idx))
            }
            None => {
                self.pos = self.text.len();
                (rest, None)
            }
        }
    }

    /// Ставит курсор сразу за ближайшим вхождением маркера.
    ///
    /// Если маркер не найден, курсор уходит в конец текста и
    /// возвращается false.
    pub fn seek_past(&mut self, marker: &str) -> bool {
        self.read_to([marker]).1.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_is_bounded() {
        let mut reader = TextReader::new("abc");
        assert_eq!(reader.read(2), "ab");
        assert_eq!(reader.read(5), "c");
        assert_eq!(reader.read(1), "");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_counts_characters() {
        let mut reader = TextReader::new("łódź1");
        assert_eq!(reader.read(4), "łódź");
        assert_eq!(reader.read_to_end(), "1");
    }

    #[test]
    fn test_read_while() {
        let mut reader = TextReader::new("0101D65,00");
        assert_eq!(reader.read_while(|c| c.is_ascii_digit(), 4), "0101");
        assert_eq!(reader.read_while(|c| c.is_ascii_digit(), 4), "");
        assert_eq!(reader.read_while(|c| c.is_alphabetic(), 1), "D");
        assert_eq!(reader.read_while(|c| c != 'x', 2), "65");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = TextReader::new("NTRF");
        assert_eq!(reader.peek(2), "NT");
        assert_eq!(reader.peek(10), "NTRF");
        reader.skip(1);
        assert_eq!(reader.remaining(), "TRF");
    }

    #[test]
    fn test_read_to_reports_nearest_marker() {
        let mut reader = TextReader::new("ref:25:account:28C:1/1");
        let (value, tag) = reader.read_to(&[":28C:", ":25:"]);
        assert_eq!(value, "ref");
        assert_eq!(tag, Some(1));
        assert_eq!(reader.remaining(), "account:28C:1/1");
    }

    #[test]
    fn test_read_to_without_marker_consumes_rest() {
        let mut reader = TextReader::new("C200101EUR379,29");
        let (value, tag) = reader.read_to(&[":64:", ":65:"]);
        assert_eq!(value, "C200101EUR379,29");
        assert_eq!(tag, None);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_to_prefers_first_listed_on_tie() {
        let mut reader = TextReader::new("abc\r\ndef");
        let (value, tag) = reader.read_to(&["\r\n", "\r"]);
        assert_eq!(value, "abc");
        assert_eq!(tag, Some(0));
        assert_eq!(reader.remaining(), "def");
    }

    #[test]
    fn test_read_to_accepts_any_marker_iterator() {
        let markers = vec![String::from(":62F:"), String::from(":61:")];
        let mut reader = TextReader::new("a:61:b:62F:c");
        assert_eq!(reader.read_to(&markers), ("a", Some(1)));
        assert_eq!(reader.read_to(markers.iter().map(String::as_str)), ("b", Some(0)));
        assert_eq!(reader.remaining(), "c");
    }

    #[test]
    fn test_seek_past() {
        let mut reader = TextReader::new("{4:\r\n:20:REF");
        assert!(reader.seek_past(":20:"));
        assert_eq!(reader.remaining(), "REF");
        assert!(!reader.seek_past(":20:"));
        assert!(reader.is_empty());
    }
}
