use cqfill_shared::byte_stream::Character::Ch;
use cqfill_shared::byte_stream::{ByteStream, Character, Location, LocationHandler, CHAR_REPLACEMENT};
use cqfill_shared::errors::CssError;
use std::fmt;

pub type Number = f32;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),
    Ident(String),
    Function(String),
    Url(String),
    BadUrl(String),
    Dimension {
        value: Number,
        unit: String,
        /// Raw source text of the numeric part, so `3.0px` and `3px` serialize verbatim
        raw: String,
        is_integer: bool,
    },
    Percentage {
        value: Number,
        raw: String,
    },
    Number {
        value: Number,
        raw: String,
        is_integer: bool,
    },
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),
    /// A `<bad-string-token>`
    ///
    /// This token always indicates a parse error.
    BadString(String),
    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    Whitespace,
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "unrestricted"
    ///
    /// The value does not include the `#` marker.
    Hash(String),
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "id"
    ///
    /// The value does not include the `#` marker.
    IDHash(String),
    /// A `<delim-token>`
    Delim(char),
    /// A `<{-token>`
    LCurly,
    /// A `<}-token>`
    RCurly,
    /// A `<(-token>`
    LParen,
    /// A `<)-token>`
    RParen,
    /// A `<[-token>`
    LBracket,
    /// A `<]-token>`
    RBracket,
    /// A `<comma-token>`
    Comma,
    /// A `:` `<colon-token>`
    Colon,
    /// A `;` `<semicolon-token>`
    Semicolon,
    // A `<!--` `<CDO-token>`
    Cdo,
    // A `-->` `<CDC-token>`
    Cdc,
    // A `<EOF-token>`
    Eof,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Location of the token in the stream
    pub location: Location,
}

impl Token {
    /// Returns a new token for the given type on the given location
    pub(crate) fn new(token_type: TokenType, location: Location) -> Token {
        Token { token_type, location }
    }

    fn new_delim(c: char, location: Location) -> Token {
        Token::new(TokenType::Delim(c), location)
    }

    fn new_id_hash(value: &str, location: Location) -> Token {
        Token::new(TokenType::IDHash(value.to_string()), location)
    }

    fn new_hash(value: &str, location: Location) -> Token {
        Token::new(TokenType::Hash(value.to_string()), location)
    }

    fn new_atkeyword(keyword: &str, location: Location) -> Token {
        Token::new(TokenType::AtKeyword(keyword.to_string()), location)
    }

    fn new_number(value: Number, raw: &str, is_integer: bool, location: Location) -> Token {
        Token::new(
            TokenType::Number {
                value,
                raw: raw.to_string(),
                is_integer,
            },
            location,
        )
    }

    fn new_percentage(value: Number, raw: &str, location: Location) -> Token {
        Token::new(
            TokenType::Percentage {
                value,
                raw: raw.to_string(),
            },
            location,
        )
    }

    fn new_dimension(value: Number, unit: &str, raw: &str, is_integer: bool, location: Location) -> Token {
        Token::new(
            TokenType::Dimension {
                value,
                unit: unit.to_string(),
                raw: raw.to_string(),
                is_integer,
            },
            location,
        )
    }

    fn new_ident(value: &str, location: Location) -> Token {
        Token::new(TokenType::Ident(value.to_string()), location)
    }

    fn new_function(value: &str, location: Location) -> Token {
        Token::new(TokenType::Function(value.to_string()), location)
    }

    fn new_quoted_string(value: &str, location: Location) -> Token {
        Token::new(TokenType::QuotedString(value.to_string()), location)
    }

    fn new_bad_string(value: &str, location: Location) -> Token {
        Token::new(TokenType::BadString(value.to_string()), location)
    }

    fn new_url(value: &str, location: Location) -> Token {
        Token::new(TokenType::Url(value.to_string()), location)
    }

    fn new_bad_url(value: &str, location: Location) -> Token {
        Token::new(TokenType::BadUrl(value.to_string()), location)
    }
}

impl Token {
    pub(crate) fn is_comma(&self) -> bool {
        matches!(self.token_type, TokenType::Comma)
    }

    pub(crate) fn is_ident(&self) -> bool {
        matches!(self.token_type, TokenType::Ident(_))
    }

    pub(crate) fn is_whitespace(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace)
    }

    pub(crate) fn is_colon(&self) -> bool {
        matches!(self.token_type, TokenType::Colon)
    }

    pub(crate) fn is_delim(&self, delim: char) -> bool {
        matches!(self.token_type, TokenType::Delim(c) if c == delim)
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self.token_type.clone() {
            TokenType::Url(val) | TokenType::BadUrl(val) => format!("url({val})"),
            TokenType::AtKeyword(val) => format!("@{val}"),
            TokenType::Hash(val) | TokenType::IDHash(val) => format!("#{val}"),
            TokenType::Ident(val) => val,
            TokenType::Function(val) => format!("{val}("),
            TokenType::QuotedString(val) | TokenType::BadString(val) => format!("\"{val}\""),
            TokenType::Delim(val) => val.to_string(),
            TokenType::Number { raw, .. } => raw,
            TokenType::Percentage { raw, .. } => format!("{raw}%"),
            TokenType::Dimension { raw, unit, .. } => format!("{raw}{unit}"),
            TokenType::Cdc => "-->".into(),
            TokenType::Cdo => "<!--".into(),
            TokenType::Colon => ":".into(),
            TokenType::Semicolon => ";".into(),
            TokenType::Comma => ",".into(),
            TokenType::LBracket => "[".into(),
            TokenType::RBracket => "]".into(),
            TokenType::LCurly => "{".into(),
            TokenType::RCurly => "}".into(),
            TokenType::LParen => "(".into(),
            TokenType::RParen => ")".into(),
            TokenType::Whitespace => " ".into(),
            TokenType::Eof => String::new(),
        };

        write!(f, "{string}")
    }
}

/// CSS Tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization)
pub struct Tokenizer<'stream> {
    stream: &'stream mut ByteStream,
    /// Position on the NEXT read to consume. If it's outside the vec list, it will return EOF
    position: usize,
    /// Full list of all tokens produced by the tokenizer
    tokens: Vec<Token>,
    /// Line/column bookkeeping of the stream
    location: LocationHandler,
    /// Tokenization errors are collected here; they never stop the tokenizer
    errors: Vec<CssError>,
}

impl<'stream> Tokenizer<'stream> {
    /// Creates a new tokenizer with the given stream that starts on the given location. This does not have
    /// to be 1/1, but can be any location.
    pub fn new(stream: &'stream mut ByteStream, start_location: Location) -> Self {
        Self {
            stream,
            position: 0,
            tokens: Vec::new(),
            location: LocationHandler::new(start_location),
            errors: Vec::new(),
        }
    }

    /// Returns the current location and takes the start location into account
    pub fn current_location(&self) -> Location {
        let start = &self.location.start_location;
        let cur = &self.location.cur_location;

        Location::new(
            start.line + cur.line - 1,
            start.column + cur.column - 1,
            cur.offset,
        )
    }

    /// Returns true when there is no next element
    pub fn eof(&self) -> bool {
        self.stream.eof() && self.position >= self.tokens.len()
    }

    /// Diagnostics collected while tokenizing
    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    /// Looks ahead at the next NON-WHITESPACE token.
    pub(crate) fn lookahead_sc(&mut self, offset: usize) -> Token {
        let mut i = offset;

        loop {
            let t = self.lookahead(i);
            if t.is_whitespace() {
                i += 1;
            } else {
                return t;
            }
        }
    }

    /// Looks ahead at the next token with offset. So lookahead(0) will look at the next token
    /// that will be consumed with consume()
    pub fn lookahead(&mut self, offset: usize) -> Token {
        while self.tokens.len() <= self.position + offset {
            let token = self.consume_token();
            let eof = token.is_eof();
            self.tokens.push(token);
            if eof {
                break;
            }
        }

        match self.tokens.get(self.position + offset) {
            Some(t) => t.clone(),
            None => Token::new(TokenType::Eof, self.current_location()),
        }
    }

    /// Consumes the next token and returns it
    pub fn consume(&mut self) -> Token {
        if self.tokens.len() == self.position {
            let token = self.consume_token();
            self.tokens.push(token);
        }

        let token = &self.tokens[self.position];
        self.position += 1;

        log::trace!("{:?}", token);

        token.clone()
    }

    /// Reconsumes will push the current position back so the next read will be the same token
    pub fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Token {
        while self.look_ahead_slice(2) == "/*" {
            self.consume_comment();
        }

        let current = self.current_char();
        let loc = self.current_location();

        match current {
            Character::StreamEnd => Token::new(TokenType::Eof, loc),
            Ch(c) if c.is_whitespace() => {
                self.consume_whitespace();
                Token::new(TokenType::Whitespace, loc)
            }
            Ch('"' | '\'') => self.consume_string_token(),
            Ch(c @ '#') => {
                // consume '#'
                self.next_char();

                if self.is_ident_char(self.current_char().into()) || self.is_start_of_escape(0) {
                    return if self.is_next_3_points_starts_ident_seq(0) {
                        Token::new_id_hash(self.consume_ident().as_str(), loc)
                    } else {
                        Token::new_hash(self.consume_ident().as_str(), loc)
                    };
                }

                Token::new_delim(c, loc)
            }
            Ch(')') => {
                self.next_char();
                Token::new(TokenType::RParen, loc)
            }
            Ch('(') => {
                self.next_char();
                Token::new(TokenType::LParen, loc)
            }
            Ch('[') => {
                self.next_char();
                Token::new(TokenType::LBracket, loc)
            }
            Ch(']') => {
                self.next_char();
                Token::new(TokenType::RBracket, loc)
            }
            Ch('{') => {
                self.next_char();
                Token::new(TokenType::LCurly, loc)
            }
            Ch('}') => {
                self.next_char();
                Token::new(TokenType::RCurly, loc)
            }
            Ch(',') => {
                self.next_char();
                Token::new(TokenType::Comma, loc)
            }
            Ch(':') => {
                self.next_char();
                Token::new(TokenType::Colon, loc)
            }
            Ch(';') => {
                self.next_char();
                Token::new(TokenType::Semicolon, loc)
            }
            Ch(c @ '+') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                // consume '+'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch('.') => {
                if self.stream.look_ahead(1).is_numeric() {
                    return self.consume_numeric_token();
                }

                // consume '.'
                self.next_char();
                Token::new_delim('.', loc)
            }
            Ch(c @ '-') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                let cdc_token = "-->";
                if self.look_ahead_slice(cdc_token.len()) == cdc_token {
                    // consume '-->'
                    self.consume_chars(cdc_token.len());
                    return Token::new(TokenType::Cdc, loc);
                }

                if self.is_next_3_points_starts_ident_seq(0) {
                    return self.consume_ident_like_seq();
                }

                // consume '-'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c @ '<') => {
                let cdo_token = "<!--";
                if self.look_ahead_slice(cdo_token.len()) == cdo_token {
                    // consume '<!--'
                    self.consume_chars(cdo_token.len());
                    return Token::new(TokenType::Cdo, loc);
                }

                // consume '<'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c @ '@') => {
                // consume '@'
                self.next_char();

                if self.is_next_3_points_starts_ident_seq(0) {
                    return Token::new_atkeyword(self.consume_ident().as_str(), loc);
                }

                Token::new_delim(c, loc)
            }
            Ch(c @ '\\') => {
                if self.is_start_of_escape(0) {
                    return self.consume_ident_like_seq();
                }

                self.parse_error("stray backslash", loc.clone());

                // consume '\'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c) if c.is_numeric() => self.consume_numeric_token(),
            Ch(c) if self.is_ident_start(c) => self.consume_ident_like_seq(),
            Ch(c) => {
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
        }
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// Comments never produce a token. An unterminated comment is a parse error, but the rest of
    /// the input is still tokenized.
    fn consume_comment(&mut self) {
        let loc = self.current_location();

        // consume '/*'
        self.consume_chars(2);

        while self.look_ahead_slice(2) != "*/" && !self.stream.eof() {
            self.next_char();
        }

        if self.stream.eof() {
            self.parse_error("unterminated comment", loc);
            return;
        }

        // consume '*/'
        self.consume_chars(2);
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    ///
    /// Returns either a `<number-token>`, `<percentage-token>`, or `<dimension-token>`.
    fn consume_numeric_token(&mut self) -> Token {
        let loc = self.current_location();

        let (raw, is_integer) = self.consume_number();
        let value: Number = raw.parse().unwrap_or(0.0);

        if self.is_next_3_points_starts_ident_seq(0) {
            let unit = self.consume_ident();

            return Token::new_dimension(value, unit.as_str(), raw.as_str(), is_integer, loc);
        } else if self.current_char() == Ch('%') {
            // consume '%'
            self.next_char();
            return Token::new_percentage(value, raw.as_str(), loc);
        }

        Token::new_number(value, raw.as_str(), is_integer, loc)
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Returns either a `<string-token>` or `<bad-string-token>`.
    fn consume_string_token(&mut self) -> Token {
        let loc = self.current_location();

        // consume string starting: (') or (") ...
        let ending = self.next_char();
        let mut value = String::new();

        loop {
            if self.stream.eof() {
                self.parse_error("unterminated string", loc.clone());
                return Token::new_quoted_string(value.as_str(), loc);
            }

            if self.current_char() == ending {
                // consume string ending
                self.next_char();
                return Token::new_quoted_string(value.as_str(), loc);
            }

            // newline: parse error
            if self.current_char() == Ch('\n') {
                // note: don't consume '\n'
                self.parse_error("newline in string", loc.clone());
                return Token::new_bad_string(value.as_str(), loc);
            }

            if self.current_char() == Ch('\\') && self.stream.look_ahead(1) == Ch('\n') {
                // escaped newline, consume both
                self.consume_chars(2);
                continue;
            }

            if self.current_char() == Ch('\\')
                && !matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_hexdigit())
                && self.stream.look_ahead(1) != Character::StreamEnd
            {
                // consume '\'
                self.next_char();

                // consume char next to `\`
                value.push(self.next_char().into());
                continue;
            }

            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_token());
                continue;
            }

            value.push(self.next_char().into());
        }
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Returns the raw source text together with the integer/number type flag.
    fn consume_number(&mut self) -> (String, bool) {
        let mut value = String::new();
        let mut is_integer = true;

        if matches!(self.current_char(), Ch('+' | '-')) {
            value.push(self.next_char().into());
        }

        value.push_str(&self.consume_digits());

        if self.current_char() == Ch('.') && self.stream.look_ahead(1).is_numeric() {
            value.push_str(&self.consume_chars(2));
            value.push_str(&self.consume_digits());
            is_integer = false;
        }

        // U+0045: LATIN CAPITAL LETTER E (E)
        // U+0065: LATIN SMALL LETTER E (e)
        let c1 = self.stream.look_ahead(0);
        let c2 = self.stream.look_ahead(1);
        let c3 = self.stream.look_ahead(2);
        if (c1 == Ch('E') || c1 == Ch('e'))
            && ((matches!(c2, Ch('-' | '+')) && c3.is_numeric()) || c2.is_numeric())
        {
            value.push(self.next_char().into());
            value.push(self.next_char().into());
            value.push_str(&self.consume_digits());
            is_integer = false;
        }

        (value, is_integer)
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns: `<ident-token>`, `<function-token>`, `<url-token>`, or `<bad-url-token>`.
    fn consume_ident_like_seq(&mut self) -> Token {
        let loc = self.current_location();

        let value = self.consume_ident();

        if value.eq_ignore_ascii_case("url") && self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            self.consume_whitespace();

            if self.is_any_of(&['"', '\'']) {
                return Token::new_function(value.as_str(), loc);
            }

            return self.consume_url();
        } else if self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            return Token::new_function(value.as_str(), loc);
        }

        Token::new_ident(value.as_str(), loc)
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Returns either a `<url-token>` or a `<bad-url-token>`
    fn consume_url(&mut self) -> Token {
        let mut url = String::new();

        let loc = self.current_location();

        self.consume_whitespace();

        loop {
            if self.current_char() == Ch(')') {
                // consume ')'
                self.next_char();
                break;
            }

            if self.stream.eof() {
                self.parse_error("unterminated url", loc.clone());
                break;
            }

            if self.current_char().is_whitespace() {
                self.consume_whitespace();
                continue;
            }

            if self.is_any_of(&['"', '\'', '(']) || self.is_non_printable_char() {
                self.parse_error("bad url", loc.clone());
                self.consume_remnants_of_bad_url();
                return Token::new_bad_url(url.as_str(), loc);
            }

            if self.is_start_of_escape(0) {
                url.push(self.consume_escaped_token());
                continue;
            }

            url.push(self.next_char().into());
        }

        Token::new_url(url.as_str(), loc)
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Used to consume enough of the input stream to reach a recovery point where normal tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            if self.current_char() == Ch(')') {
                self.next_char();
                break;
            }

            if self.stream.eof() {
                break;
            }

            if self.is_start_of_escape(0) {
                self.consume_escaped_token();
                continue;
            }

            self.next_char();
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    fn consume_escaped_token(&mut self) -> char {
        // consume '\'
        self.next_char();

        let mut value = String::new();

        // eof: parse error
        if self.stream.eof() {
            return CHAR_REPLACEMENT;
        }

        while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) && value.len() <= 5 {
            value.push(self.next_char().into());
        }

        if self.current_char().is_whitespace() {
            self.next_char();
        }

        if value.is_empty() {
            return CHAR_REPLACEMENT;
        }

        let as_u32 = u32::from_str_radix(&value, 16).unwrap_or(0);

        match char::from_u32(as_u32) {
            Some(c) if c != '\u{0000}' && as_u32 <= 0x0010_FFFF => c,
            _ => CHAR_REPLACEMENT,
        }
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Note: that algorithm does not do the verification that is necessary to
    /// ensure the returned code points would constitute an `<ident-token>`.
    /// Caller should ensure that the stream starts with an ident sequence before calling this
    /// algorithm.
    fn consume_ident(&mut self) -> String {
        let mut value = String::new();

        loop {
            if self.current_char() == Ch('\\')
                && !matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_hexdigit())
                && self.stream.look_ahead(1) != Character::StreamEnd
            {
                // consume '\'
                self.next_char();

                // consume char next to `\`
                value.push(self.next_char().into());
                continue;
            }

            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_token());
                continue;
            }

            if !self.is_ident_char(self.current_char().into()) {
                break;
            }

            value.push(self.next_char().into());
        }

        value
    }

    fn consume_digits(&mut self) -> String {
        let mut value = String::new();

        while self.current_char().is_numeric() {
            value.push(self.next_char().into());
        }

        value
    }

    fn consume_chars(&mut self, mut len: usize) -> String {
        let mut value = String::new();

        while len > 0 {
            value.push(self.next_char().into());
            len -= 1;
        }

        value
    }

    fn consume_whitespace(&mut self) {
        while self.current_char().is_whitespace() {
            self.next_char();
        }
    }

    /// [ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
    fn is_ident_start(&self, char: char) -> bool {
        char.is_alphabetic() || !char.is_ascii() || char == '_'
    }

    /// [ident code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
    fn is_ident_char(&self, char: char) -> bool {
        self.is_ident_start(char) || char.is_numeric() || char == '-'
    }

    /// def: [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
    fn is_non_printable_char(&self) -> bool {
        if let Ch(char) = self.current_char() {
            ('\u{0000}'..='\u{0008}').contains(&char)
                || ('\u{000E}'..='\u{001F}').contains(&char)
                || char == '\u{000B}'
                || char == '\u{007F}'
        } else {
            false
        }
    }

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_start_of_escape(&self, start: usize) -> bool {
        let current_char = self.stream.look_ahead(start);
        let next_char = self.stream.look_ahead(start + 1);

        current_char == Ch('\\') && next_char != Ch('\n')
    }

    /// 4.3.9. [Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn is_next_3_points_starts_ident_seq(&self, start: usize) -> bool {
        let first = self.stream.look_ahead(start);
        let second = self.stream.look_ahead(start + 1);

        if first == Ch('-') {
            return self.is_ident_start(second.into())
                || second == Ch('-')
                || self.is_start_of_escape(start + 1);
        }

        if first == Ch('\\') {
            return self.is_start_of_escape(start);
        }

        match first {
            Ch(c) => self.is_ident_start(c),
            Character::StreamEnd => false,
        }
    }

    fn is_signed_decimal(&self, start: usize) -> bool {
        let current = self.stream.look_ahead(start);
        let next = self.stream.look_ahead(start + 1);
        let last = self.stream.look_ahead(start + 2);

        // e.g. +1, -1, +.1, -0.01
        matches!(current, Ch('+' | '-')) && ((next == Ch('.') && last.is_numeric()) || next.is_numeric())
    }

    fn is_any_of(&self, chars: &[char]) -> bool {
        let current_char = self.current_char();
        for char in chars {
            if current_char == Ch(*char) {
                return true;
            }
        }

        false
    }

    fn current_char(&self) -> Character {
        self.stream.look_ahead(0)
    }

    fn next_char(&mut self) -> Character {
        if self.stream.eof() {
            return Character::StreamEnd;
        }

        let c = self.stream.read_and_next();
        self.location.inc(c);

        c
    }

    fn look_ahead_slice(&self, len: usize) -> String {
        let mut s = String::new();

        for i in 0..len {
            match self.stream.look_ahead(i) {
                Ch(c) => s.push(c),
                Character::StreamEnd => break,
            }
        }

        s
    }

    fn parse_error(&mut self, message: &str, location: Location) {
        self.errors.push(CssError::with_location(message, location));
    }
}
