use steady_common::{Command, Locator, ParseError, WaitCondition, WaitOptions, parse_command};

#[test]
fn test_parse_goto() {
    let cmd = parse_command("goto https://example.com/login").unwrap();
    assert_eq!(cmd, Command::GoTo("https://example.com/login".into()));

    let cmd = parse_command("navigate example.com").unwrap();
    assert_eq!(cmd, Command::GoTo("example.com".into()));
}

#[test]
fn test_parse_click_with_quoted_selector() {
    let cmd = parse_command(r#"click "button[aria-label='Sign in']""#).unwrap();
    assert_eq!(
        cmd,
        Command::Click(Locator::css("button[aria-label='Sign in']"))
    );
}

#[test]
fn test_parse_type_keeps_quoted_text() {
    let cmd = parse_command(r#"type #email "  spaced  out ""#).unwrap();
    assert_eq!(
        cmd,
        Command::Type(Locator::css("#email"), "  spaced  out ".into())
    );

    // Unquoted text is joined with single spaces
    let cmd = parse_command("type id=search rust   async").unwrap();
    assert_eq!(cmd, Command::Type(Locator::id("search"), "rust async".into()));
}

#[test]
fn test_parse_type_requires_text() {
    let err = parse_command("type #email").unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArgument {
            command: "type",
            what: "text"
        }
    );
}

#[test]
fn test_parse_wait_conditions() {
    assert_eq!(
        parse_command("wait visible .toast").unwrap(),
        Command::Wait(
            WaitCondition::Visible(Locator::css(".toast")),
            WaitOptions::default()
        )
    );
    assert_eq!(
        parse_command("wait gone //div[@id='spinner']").unwrap(),
        Command::Wait(
            WaitCondition::Hidden(Locator::xpath("//div[@id='spinner']")),
            WaitOptions::default()
        )
    );
    assert_eq!(
        parse_command("wait clickable #submit --timeout 2500").unwrap(),
        Command::Wait(
            WaitCondition::Clickable(Locator::css("#submit")),
            WaitOptions {
                timeout_ms: Some(2500)
            }
        )
    );
    assert_eq!(
        parse_command("wait text h1 Welcome back").unwrap(),
        Command::Wait(
            WaitCondition::Text(Locator::css("h1"), "Welcome back".into()),
            WaitOptions::default()
        )
    );
}

#[test]
fn test_parse_wait_errors() {
    assert!(matches!(
        parse_command("wait forever #x"),
        Err(ParseError::UnknownWaitCondition(_))
    ));
    assert!(matches!(
        parse_command("wait visible #x --timeout soon"),
        Err(ParseError::InvalidFlag { .. })
    ));
    assert!(matches!(
        parse_command("wait visible"),
        Err(ParseError::MissingArgument { what: "locator", .. })
    ));
    assert!(matches!(
        parse_command("wait visible #a #b"),
        Err(ParseError::UnexpectedArgument(_))
    ));
}

#[test]
fn test_parse_script_is_verbatim() {
    let cmd = parse_command(r#"script return document.querySelector("h1").innerText"#).unwrap();
    assert_eq!(
        cmd,
        Command::Script(r#"return document.querySelector("h1").innerText"#.into())
    );
    assert!(parse_command("script").is_err());
}

#[test]
fn test_parse_screenshot() {
    assert_eq!(
        parse_command("screenshot").unwrap(),
        Command::Screenshot(None)
    );
    assert_eq!(
        parse_command("snap shots/home.png").unwrap(),
        Command::Screenshot(Some("shots/home.png".into()))
    );
}

#[test]
fn test_unknown_and_extra_arguments() {
    assert_eq!(
        parse_command("hover #menu").unwrap_err(),
        ParseError::UnknownCommand("hover".into())
    );
    assert!(matches!(
        parse_command("click #a #b"),
        Err(ParseError::UnexpectedArgument(_))
    ));
    assert_eq!(parse_command("   ").unwrap_err(), ParseError::Empty);
}

#[test]
fn test_unterminated_quote_is_rejected() {
    assert_eq!(
        parse_command("click \"#a").unwrap_err(),
        ParseError::UnterminatedQuote('"')
    );
    assert_eq!(
        parse_command("type #email 'half open").unwrap_err(),
        ParseError::UnterminatedQuote('\'')
    );
    assert_eq!(
        parse_command(r#"wait text .status "Saved --timeout 500"#).unwrap_err(),
        ParseError::UnterminatedQuote('"')
    );

    // An escaped quote does not close the string
    assert_eq!(
        parse_command(r#"type #q "say \"hi\"""#).unwrap(),
        Command::Type(Locator::css("#q"), r#"say "hi""#.into())
    );
}
