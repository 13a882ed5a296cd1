use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::QuizQuestion;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(app: &App, frame: &mut Frame) {
    match app.screen {
        Screen::Welcome => render_welcome(app, frame),
        Screen::Loading => render_loading(app, frame),
        Screen::Quiz => render_quiz(app, frame),
        Screen::Feedback => render_feedback(app, frame),
        Screen::Results => render_results(app, frame),
    }
}

fn render_welcome(app: &App, frame: &mut Frame) {
    let block = Block::default()
        .title(" JLPT N2 文法・語彙クイズ ")
        .borders(Borders::ALL);

    let mut text = vec![
        Line::from(Span::styled(
            "日本語能力試験N2合格に向けて、実践的な問題で実力を試しましょう。",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("詳細な解説で、あなたの学習を徹底サポートします。"),
        Line::from(""),
    ];

    if let Some(error) = &app.last_error {
        text.push(Line::from(Span::styled(
            format!("エラー: {}", error),
            Style::default().fg(Color::Red),
        )));
        text.push(Line::from(""));
    }

    text.push(Line::from("Enter でクイズを始める (Press Enter to start)"));
    text.push(Line::from("q で終了 (Press q to quit)"));

    let p = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ]
            .as_ref(),
        )
        .split(frame.area());

    frame.render_widget(p, chunks[1]);
}

fn render_loading(app: &App, frame: &mut Frame) {
    let spinner = SPINNER_FRAMES[(app.loading_tick / 5) % SPINNER_FRAMES.len()];

    let text = vec![
        Line::from(Span::styled(
            format!("{} 問題を生成しています...", spinner),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "少々お待ちください",
            Style::default().fg(Color::Gray),
        )),
    ];

    let p = Paragraph::new(text).alignment(Alignment::Center);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(45),
                Constraint::Length(3),
                Constraint::Percentage(45),
            ]
            .as_ref(),
        )
        .split(frame.area());

    frame.render_widget(p, chunks[1]);
}

fn render_quiz(app: &App, frame: &mut Frame) {
    let Some(question) = app.current_question() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),              // progress
                Constraint::Min(5),                 // question
                Constraint::Length(6),              // options
                Constraint::Length(1),              // footer
            ]
            .as_ref(),
        )
        .split(frame.area());

    let total = app.questions.len();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" 進捗 "))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio((app.current_index + 1) as f64 / total as f64)
        .label(format!("{} / {}", app.current_index + 1, total));
    frame.render_widget(gauge, chunks[0]);

    let question_text = vec![
        Line::from(Span::styled(
            format!("[{}]", question.question_type.label()),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(question.question_sentence.as_str()),
    ];
    let question_p = Paragraph::new(question_text)
        .block(Block::default().borders(Borders::ALL).title(" 問題 "))
        .wrap(Wrap { trim: true });
    frame.render_widget(question_p, chunks[1]);

    render_options(app, question, frame, chunks[2]);

    let footer = Paragraph::new("↑/↓で選択、Enterで回答 (または 1-4)、qで終了")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}

fn render_options(app: &App, question: &QuizQuestion, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for (i, option) in question.options.iter().enumerate() {
        let (marker, style) = if i == app.selected_option {
            (
                "▶ ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", Style::default().fg(Color::White))
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}. {}", marker, i + 1, option),
            style,
        )));
    }

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" 選択肢 "));
    frame.render_widget(p, area);
}

fn render_feedback(app: &App, frame: &mut Frame) {
    let (Some(question), Some(answer)) = (app.current_question(), app.current_answer()) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(frame.area());

    let (verdict, color) = if answer.is_correct {
        ("正解", Color::Green)
    } else {
        ("不正解", Color::Red)
    };
    let header = Paragraph::new(Span::styled(
        verdict,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let explanation = &question.explanation;
    let mut body = vec![Line::from(Span::styled(
        question.sentence_with_answer(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if !answer.is_correct {
        body.push(Line::from(""));
        body.push(Line::from(format!(
            "あなたの回答: {}",
            question.options[answer.selected_option_index]
        )));
        body.push(Line::from(format!("正解: {}", question.correct_option())));
    }

    body.push(Line::from(""));
    body.push(Line::from(Span::styled(
        explanation.title.as_str(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    body.push(Line::from(vec![
        Span::styled("意味: ", Style::default().fg(Color::Blue)),
        Span::raw(explanation.meaning.as_str()),
    ]));
    body.push(Line::from(vec![
        Span::styled("解説: ", Style::default().fg(Color::Green)),
        Span::raw(explanation.why_correct.as_str()),
    ]));

    body.push(Line::from(""));
    body.push(Line::from(Span::styled(
        "他の選択肢",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for reason in &explanation.why_incorrect {
        body.push(Line::from(format!("・{}", reason)));
    }

    body.push(Line::from(""));
    body.push(Line::from(Span::styled(
        "例文",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for example in &explanation.example_sentences {
        body.push(Line::from(format!("・{}", example.sentence)));
    }

    let body_p = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(" 解説 "))
        .wrap(Wrap { trim: true });
    frame.render_widget(body_p, chunks[1]);

    let footer = Paragraph::new("Enter で次の問題へ")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);
}

fn render_results(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(4)].as_ref())
        .split(frame.area());

    let score_text = vec![
        Line::from("あなたのスコア"),
        Line::from(Span::styled(
            format!("{}%", app.score_percent()),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} / {} 問正解",
            app.correct_count(),
            app.answers.len()
        )),
    ];
    let score = Paragraph::new(score_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" クイズ結果 "));
    frame.render_widget(score, chunks[0]);

    let missed = app.missed_questions();
    let mut missed_lines = Vec::new();
    if missed.is_empty() {
        missed_lines.push(Line::from(Span::styled(
            "全問正解です！お見事！",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    } else {
        for question in &missed {
            missed_lines.push(Line::from(question.sentence_with_answer()));
            missed_lines.push(Line::from(Span::styled(
                format!("  正解: {}", question.correct_option()),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    let missed_p = Paragraph::new(missed_lines)
        .block(Block::default().borders(Borders::ALL).title(" 間違えた問題 "))
        .wrap(Wrap { trim: true });
    frame.render_widget(missed_p, chunks[1]);

    let mut hints = Vec::new();
    if app.has_incorrect_answers() {
        hints.push(Line::from("m: 間違えた問題だけ復習する"));
    }
    hints.push(Line::from("r: 新しい問題セットを生成"));
    hints.push(Line::from("q: 終了"));
    let hints_p = Paragraph::new(hints)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hints_p, chunks[2]);
}
